//! Per-call request options and credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// User name and password (or API token) for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Jenkins user name.
    pub username: String,
    /// Password or API token.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Replaces the client's configured credentials for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOverride {
    /// Send the request without an `Authorization` header.
    Anonymous,
    /// Authenticate with these credentials instead.
    Basic(Credentials),
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// XML document, sent as `text/xml`.
    Xml(String),
    /// Plain text.
    Text(String),
}

impl Body {
    /// Default `Content-Type` for this payload.
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Form(_) => "application/x-www-form-urlencoded",
            Body::Xml(_) => "text/xml",
            Body::Text(_) => "text/plain; charset=utf-8",
        }
    }

    /// Encode the payload for the wire.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter())
                    .finish();
                Bytes::from(encoded)
            }
            Body::Xml(text) | Body::Text(text) => Bytes::from(text.clone()),
        }
    }
}

/// Options for a single call through [`Jenkins::request`](crate::Jenkins::request).
///
/// # Examples
///
/// ```
/// use jenkins_async::RequestOptions;
/// use std::time::Duration;
///
/// let options = RequestOptions::new()
///     .query("depth", "1")
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Body>,
    pub(crate) headers: HeaderMap,
    pub(crate) auth: Option<AuthOverride>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) follow_redirects: bool,
    pub(crate) attach_crumb: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            auth: None,
            timeout: None,
            follow_redirects: true,
            attach_crumb: true,
        }
    }
}

impl RequestOptions {
    /// Options with no query, body or extra headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Form-encoded body.
    #[must_use]
    pub fn form<K, V>(self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body(Body::Form(fields))
    }

    /// XML body.
    #[must_use]
    pub fn xml(self, document: impl Into<String>) -> Self {
        self.body(Body::Xml(document.into()))
    }

    /// Add an explicit header. Explicit headers take precedence over the crumb,
    /// cookie and content-type headers the client adds itself.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Override the client's credentials for this call.
    #[must_use]
    pub fn auth(mut self, auth: AuthOverride) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Per-call timeout, taking precedence over the client's configured timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Return 3xx responses as-is instead of following them.
    #[must_use]
    pub fn no_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    pub(crate) fn without_crumb(mut self) -> Self {
        self.attach_crumb = false;
        self
    }
}
