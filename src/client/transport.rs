//! The transport seam between the request layer and the network.
//!
//! [`Transport`] is the single operation the request layer needs: send one fully
//! prepared request and hand back a buffered [`Response`]. The production
//! implementation, [`ReqwestTransport`], owns a pooled `reqwest` client;
//! [`RetryingTransport`](crate::client::RetryingTransport) decorates any
//! transport with retries.
//!
//! Transport errors describe the network only. HTTP error statuses are still
//! successful transport exchanges and are classified by the request layer.

use crate::error::{JenkinsError, Result};
use crate::types::Response;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query.
    pub url: Url,
    /// Complete header set (auth, crumb, cookies, content type).
    pub headers: HeaderMap,
    /// Encoded body.
    pub body: Option<Bytes>,
    /// Bound on the whole exchange.
    pub timeout: Option<Duration>,
    /// Whether 3xx responses are followed.
    pub follow_redirects: bool,
}

/// Network-level failure.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// DNS failure, refused or reset connection.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request exceeded its timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Any other failure while sending or reading the response.
    #[error("request failed: {0}")]
    Other(String),
}

/// Sends prepared requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange.
    async fn send(&self, request: TransportRequest)
        -> std::result::Result<Response, TransportError>;

    /// Release pooled connections. The default does nothing.
    async fn close(&self) {}
}

/// Connection-pooled transport backed by `reqwest`.
///
/// Holds two clients sharing the same TLS settings: one follows redirects, the
/// other returns 3xx responses unchanged so callers can read `Location`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the pooled clients. `verify = false` accepts invalid certificates.
    pub fn new(verify: bool) -> Result<Self> {
        let client = Self::builder(verify)
            .build()
            .map_err(|e| JenkinsError::Config(format!("failed to build HTTP client: {}", e)))?;
        let no_redirect = Self::builder(verify)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| JenkinsError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(ReqwestTransport {
            client,
            no_redirect,
        })
    }

    fn builder(verify: bool) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .danger_accept_invalid_certs(!verify)
            .pool_idle_timeout(Duration::from_secs(90))
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<Response, TransportError> {
        let client = if request.follow_redirects {
            &self.client
        } else {
            &self.no_redirect
        };

        let mut req_builder = client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?;

        Ok(Response::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_and_without_verification() {
        assert!(ReqwestTransport::new(true).is_ok());
        assert!(ReqwestTransport::new(false).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        let transport = ReqwestTransport::new(true).unwrap();
        // Port 9 (discard) is closed on CI machines.
        let request = TransportRequest {
            method: Method::GET,
            url: Url::parse("http://127.0.0.1:9/api/json").unwrap(),
            headers: HeaderMap::new(),
            body: None,
            timeout: Some(Duration::from_secs(5)),
            follow_redirects: true,
        };

        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect(_) | TransportError::Other(_) | TransportError::Timeout(_)
        ));
    }
}
