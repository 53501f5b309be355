//! Session cookie store.
//!
//! Jenkins ties issued crumbs to the HTTP session (`JSESSIONID...`), so cookies
//! set by earlier responses are sent back on later calls.

use cookie::Cookie;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::warn;

/// Name to value map of cookies received from the server.
#[derive(Debug, Default)]
pub(crate) struct CookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record every `Set-Cookie` header. A cookie with a non-positive
    /// `Max-Age` is removed.
    pub(crate) fn store_from(&self, headers: &HeaderMap) {
        let mut parsed = Vec::new();

        for value in headers.get_all(SET_COOKIE).iter() {
            let Ok(text) = value.to_str() else {
                warn!(header_value = ?value, "invalid Set-Cookie header (non-UTF8)");
                continue;
            };
            match Cookie::parse(text) {
                Ok(cookie) => parsed.push(cookie.into_owned()),
                Err(e) => warn!(header_value = %text, error = %e, "failed to parse Set-Cookie header"),
            }
        }

        if parsed.is_empty() {
            return;
        }

        let mut cookies = self.cookies.write();
        for cookie in parsed {
            let expired = cookie
                .max_age()
                .is_some_and(|age| age.is_zero() || age.is_negative());
            if expired {
                cookies.remove(cookie.name());
            } else {
                cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }

    /// Value for the outgoing `Cookie` header, if any cookie is held.
    pub(crate) fn header_value(&self) -> Option<HeaderValue> {
        let cookies = self.cookies.read();
        if cookies.is_empty() {
            return None;
        }

        let header = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");

        match HeaderValue::from_str(&header) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "failed to build Cookie header");
                None
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cookies.read().len()
    }
}
