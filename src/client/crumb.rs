//! Anti-CSRF crumb cache and its resolution.
//!
//! # State Machine
//!
//! ```text
//! Unset --(probe 404)--> Unsupported (terminal)
//! Unset --(probe 200)--> Concrete(token)
//! Concrete(token) --(403 on use)--> Unset --(re-probe)--> Concrete(token') | Unsupported
//! ```
//!
//! Updates are last-write-wins. Two calls that both observe `Unset` may both
//! probe the issuer; they converge on the same cached value.

use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::endpoints;
use crate::types::RequestOptions;
use http::Method;
use parking_lot::RwLock;
use serde::Deserialize;

/// Cached crumb state of one client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Crumb {
    /// Not fetched yet.
    #[default]
    Unset,
    /// The server has no crumb issuer; never probed again.
    Unsupported,
    /// Header to attach to every request.
    Concrete {
        /// Header name, usually `Jenkins-Crumb`.
        field: String,
        /// Token value.
        value: String,
    },
}

impl Crumb {
    /// Whether a header will be attached.
    pub fn is_concrete(&self) -> bool {
        matches!(self, Crumb::Concrete { .. })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrumbResponse {
    crumb_request_field: String,
    crumb: String,
}

#[derive(Debug, Default)]
pub(crate) struct CrumbCache {
    state: RwLock<Crumb>,
}

impl CrumbCache {
    pub(crate) fn get(&self) -> Crumb {
        self.state.read().clone()
    }

    pub(crate) fn set(&self, crumb: Crumb) {
        *self.state.write() = crumb;
    }

    /// Drop a concrete crumb so the next call re-probes. `Unsupported` is kept.
    pub(crate) fn invalidate(&self) {
        let mut state = self.state.write();
        if state.is_concrete() {
            *state = Crumb::Unset;
        }
    }
}

impl Jenkins {
    /// Current crumb state, without network access.
    pub fn crumb(&self) -> Crumb {
        self.inner.crumb.get()
    }

    /// Resolve the crumb, probing the issuer only while the state is `Unset`.
    ///
    /// A 404 from the issuer caches [`Crumb::Unsupported`]. Any other failure is
    /// returned and leaves the state `Unset`, so the next call probes again.
    pub async fn ensure_crumb(&self) -> Result<Crumb> {
        let current = self.inner.crumb.get();
        if current != Crumb::Unset {
            return Ok(current);
        }

        let options = RequestOptions::new().without_crumb();
        let crumb = match self
            .execute(Method::GET, endpoints::CRUMB_ISSUER, options)
            .await
        {
            Ok(response) => {
                let body: CrumbResponse = response.json()?;
                tracing::debug!("acquired crumb for header {}", body.crumb_request_field);
                Crumb::Concrete {
                    field: body.crumb_request_field,
                    value: body.crumb,
                }
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("server has no crumb issuer");
                Crumb::Unsupported
            }
            Err(e) => return Err(e),
        };

        self.inner.crumb.set(crumb.clone());
        Ok(crumb)
    }
}
