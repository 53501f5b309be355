//! The Jenkins client: request executor and orchestrator.
//!
//! Every call made by this crate funnels through two layers:
//!
//! - [`Jenkins::request`] is the orchestrator. It makes sure a crumb has been
//!   resolved, and when a cached crumb is rejected with 403 it refreshes the
//!   crumb and retries the call once.
//! - `execute` is the executor. It attaches credentials, the crumb, session
//!   cookies and the timeout, sends the request through the session transport
//!   and turns error statuses into [`JenkinsError`].
//!
//! # Examples
//!
//! ```no_run
//! use jenkins_async::{Jenkins, RequestOptions};
//! use http::Method;
//! use std::time::Duration;
//!
//! # async fn run() -> jenkins_async::Result<()> {
//! let jenkins = Jenkins::builder("http://localhost:8080")
//!     .credentials("admin", "admin")
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let response = jenkins
//!     .request(Method::GET, "/api/json", RequestOptions::new().query("depth", 1))
//!     .await?;
//! println!("{}", response.text());
//!
//! jenkins.close().await;
//! # Ok(())
//! # }
//! ```

use crate::client::config::ClientConfig;
use crate::client::cookies::CookieJar;
use crate::client::crumb::{Crumb, CrumbCache};
use crate::client::retry::{RetryPolicy, RetryingTransport};
use crate::client::session::Session;
use crate::client::transport::{ReqwestTransport, Transport, TransportRequest};
use crate::error::{JenkinsError, Result};
use crate::types::{AuthOverride, RequestOptions, Response};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::Method;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Asynchronous Jenkins client.
///
/// Cloning is cheap: clones share the configuration, the crumb, the session
/// cookies and the connection pool.
#[derive(Clone)]
pub struct Jenkins {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) config: ClientConfig,
    pub(crate) crumb: CrumbCache,
    pub(crate) cookies: CookieJar,
    pub(crate) session: Session,
}

impl fmt::Debug for Jenkins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jenkins")
            .field("host", &self.inner.config.host)
            .field("crumb", &self.inner.crumb.get())
            .field("session_open", &self.inner.session.is_open())
            .finish()
    }
}

/// Builder for [`Jenkins`].
pub struct JenkinsBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl JenkinsBuilder {
    /// Authenticate every call with `username` and `password` (or API token).
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config = self.config.with_credentials(username, password);
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub fn verify(mut self, verify: bool) -> Self {
        self.config = self.config.with_verify(verify);
        self
    }

    /// Default timeout for every call.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Retry transient failures.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config = self.config.with_retry(retry);
        self
    }

    /// Send requests through `transport` instead of the built-in `reqwest`
    /// pool. A configured retry policy still wraps it.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and create the client.
    ///
    /// No connection is opened here; the transport is created by the first call.
    pub fn build(self) -> Result<Jenkins> {
        self.config.validate()?;

        let verify = self.config.verify;
        let retry = self.config.retry.clone();
        let custom = self.transport;

        let session = Session::new(Box::new(move || -> Result<Arc<dyn Transport>> {
            let base: Arc<dyn Transport> = match &custom {
                Some(transport) => Arc::clone(transport),
                None => Arc::new(ReqwestTransport::new(verify)?),
            };
            let transport: Arc<dyn Transport> = match &retry {
                Some(policy) => Arc::new(RetryingTransport::new(base, policy.clone())),
                None => base,
            };
            Ok(transport)
        }));

        Ok(Jenkins {
            inner: Arc::new(Inner {
                config: self.config,
                crumb: CrumbCache::default(),
                cookies: CookieJar::new(),
                session,
            }),
        })
    }
}

impl Jenkins {
    /// Client for `host` without credentials.
    pub fn new(host: impl AsRef<str>) -> Result<Self> {
        Self::builder(host).build()
    }

    /// Start configuring a client for `host`.
    pub fn builder(host: impl AsRef<str>) -> JenkinsBuilder {
        JenkinsBuilder {
            config: ClientConfig::new(host),
            transport: None,
        }
    }

    /// Client from a complete configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        JenkinsBuilder {
            config,
            transport: None,
        }
        .build()
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Normalized server base URL.
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Release pooled connections.
    ///
    /// A no-op when no request was ever made. Calls issued after `close` fail
    /// with [`JenkinsError::Closed`]. Must not race with in-flight calls.
    pub async fn close(&self) {
        self.inner.session.close().await;
    }

    /// Call an endpoint, resolving the crumb first.
    ///
    /// When a cached crumb is answered with 403 the crumb is re-probed and the
    /// call retried exactly once; a second 403 is returned to the caller. Note
    /// that a 403 caused by missing permissions also triggers this refresh.
    #[tracing::instrument(level = "debug", skip(self, options))]
    pub async fn request(&self, method: Method, path: &str, options: RequestOptions) -> Result<Response> {
        match self.inner.crumb.get() {
            Crumb::Concrete { .. } => {
                match self.execute(method.clone(), path, options.clone()).await {
                    Err(e) if e.status() == Some(403) => {
                        warn!("request rejected with cached crumb, refreshing crumb");
                        self.inner.crumb.invalidate();
                        self.ensure_crumb().await?;
                        self.execute(method, path, options).await
                    }
                    result => result,
                }
            }
            Crumb::Unsupported => self.execute(method, path, options).await,
            Crumb::Unset => {
                self.ensure_crumb().await?;
                self.execute(method, path, options).await
            }
        }
    }

    /// GET `path` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        self.request(Method::GET, path, options).await?.json()
    }

    /// GET `path` and return the body as text.
    pub(crate) async fn get_text(&self, path: &str, options: RequestOptions) -> Result<String> {
        Ok(self.request(Method::GET, path, options).await?.text())
    }

    /// POST to `path`, discarding the response body.
    pub(crate) async fn post(&self, path: &str, options: RequestOptions) -> Result<()> {
        self.request(Method::POST, path, options).await?;
        Ok(())
    }

    /// Send one request with credentials, crumb, cookies and timeout attached.
    pub(crate) async fn execute(&self, method: Method, target: &str, options: RequestOptions) -> Result<Response> {
        let inner = &self.inner;
        let url = self.resolve_url(target, &options.query)?;
        let mut headers = options.headers;

        let credentials = match options.auth {
            Some(AuthOverride::Anonymous) => None,
            Some(AuthOverride::Basic(credentials)) => Some(credentials),
            None => inner.config.credentials.clone(),
        };
        if let Some(credentials) = credentials {
            if !headers.contains_key(AUTHORIZATION) {
                let value = HeaderValue::from_str(&credentials.basic_header())
                    .map_err(|e| JenkinsError::Config(format!("invalid credentials: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        if options.attach_crumb {
            if let Crumb::Concrete { field, value } = inner.crumb.get() {
                let name = HeaderName::from_bytes(field.as_bytes())
                    .map_err(|e| JenkinsError::Protocol(format!("invalid crumb field {:?}: {}", field, e)))?;
                if !headers.contains_key(&name) {
                    let value = HeaderValue::from_str(&value)
                        .map_err(|e| JenkinsError::Protocol(format!("invalid crumb value: {}", e)))?;
                    headers.insert(name, value);
                }
            }
        }

        if !headers.contains_key(COOKIE) {
            if let Some(cookie) = inner.cookies.header_value() {
                headers.insert(COOKIE, cookie);
            }
        }

        let body = options.body.map(|body| {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(body.content_type()));
            }
            body.to_bytes()
        });

        let request = TransportRequest {
            method,
            url,
            headers,
            body,
            timeout: options.timeout.or(inner.config.timeout),
            follow_redirects: options.follow_redirects,
        };

        let transport = inner.session.transport()?;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = transport
            .send(request)
            .await
            .map_err(|e| JenkinsError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            debug!(status, "request failed");
            return Err(JenkinsError::from_status(status, &response.text()));
        }

        inner.cookies.store_from(response.headers());
        Ok(response)
    }

    /// Absolute URLs are used verbatim, paths are appended to the host.
    fn resolve_url(&self, target: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!("{}{}", self.inner.config.host, target)
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| JenkinsError::Protocol(format!("invalid request URL {:?}: {}", raw, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }
}
