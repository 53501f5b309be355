//! Shared test fixtures: a scripted in-memory transport and mock server helpers.

use crate::client::{Transport, TransportError, TransportRequest};
use crate::types::Response;
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::Mutex;
use std::sync::Arc;

type Handler = Box<dyn Fn(&TransportRequest) -> Result<Response, TransportError> + Send + Sync>;

/// Transport answering every request through a closure and recording it.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        handler: impl Fn(&TransportRequest) -> Result<Response, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(ScriptedTransport {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Every request seen so far.
    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests whose path equals `path`.
    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    /// Requests whose path equals `path`.
    pub(crate) fn requests_to(&self, path: &str) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.path() == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<Response, TransportError> {
        let result = (self.handler)(&request);
        self.requests.lock().push(request);
        result
    }
}

/// Response with a status and body.
pub(crate) fn respond(status: u16, body: &str) -> Result<Response, TransportError> {
    let status = StatusCode::from_u16(status).unwrap();
    Ok(Response::new(status, HeaderMap::new(), body.to_string()))
}

/// Response with a status, one header and an empty body.
pub(crate) fn respond_with_header(status: u16, name: &'static str, value: &str) -> Result<Response, TransportError> {
    let mut headers = HeaderMap::new();
    headers.insert(name, HeaderValue::from_str(value).unwrap());
    Ok(Response::new(StatusCode::from_u16(status).unwrap(), headers, ""))
}

/// Crumb issuer body.
pub(crate) fn crumb_body(value: &str) -> String {
    format!(r#"{{"crumb":"{}","crumbRequestField":"Jenkins-Crumb"}}"#, value)
}

/// Mock server whose crumb issuer answers 404. Keep the returned mock alive.
pub(crate) async fn server_without_crumb() -> (mockito::ServerGuard, mockito::Mock) {
    let mut server = mockito::Server::new_async().await;
    let probe = server
        .mock("GET", "/crumbIssuer/api/json")
        .with_status(404)
        .create_async()
        .await;
    (server, probe)
}
