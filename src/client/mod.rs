//! Jenkins HTTP client implementation.
//!
//! This module holds the request/session layer every API call goes through:
//!
//! - **Authenticate** each call with Basic credentials or a per-call override
//! - **Resolve the crumb** (anti-CSRF token) lazily and refresh it on 403
//! - **Keep session cookies** so crumbs stay valid across calls
//! - **Retry** transient failures with exponential backoff
//! - **Classify** error statuses into [`JenkinsError`](crate::JenkinsError)
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch     - Jenkins client, executor and orchestrator
//! ├── crumb     - Crumb state and resolution
//! ├── cookies   - Session cookie store
//! ├── session   - Lazily created transport session
//! ├── transport - Transport trait and reqwest implementation
//! ├── retry     - Retry policy and retrying transport
//! ├── server    - Server-wide operations
//! └── config    - Client configuration
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Jenkins`] | The client |
//! | [`JenkinsBuilder`] | Step-by-step client construction |
//! | [`ClientConfig`] | Complete client configuration |
//! | [`RetryPolicy`] | Bounded retry with backoff |
//! | [`Crumb`] | Cached crumb state |
//! | [`Transport`] | Seam for the network layer |
//!
//! # Examples
//!
//! ```
//! use jenkins_async::client::{Jenkins, RetryPolicy};
//!
//! let jenkins = Jenkins::builder("http://localhost:8080")
//!     .credentials("admin", "11a0...token")
//!     .retry(RetryPolicy::new(5).with_statuses([429]))
//!     .build()
//!     .unwrap();
//! assert_eq!(jenkins.host(), "http://localhost:8080");
//!
//! // Invalid retry policies fail before any request is made.
//! assert!(Jenkins::builder("http://localhost:8080")
//!     .retry(RetryPolicy::new(0))
//!     .build()
//!     .is_err());
//! ```

mod config;
mod cookies;
mod crumb;
mod fetch;
mod retry;
mod server;
mod session;
mod transport;

pub use config::{ClientConfig, DEFAULT_HOST, ENV_PASSWORD, ENV_TIMEOUT, ENV_URL, ENV_USER};
pub use crumb::Crumb;
pub use fetch::{Jenkins, JenkinsBuilder};
pub use retry::{RetryPolicy, RetryingTransport};
pub use server::GeneratedToken;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportRequest};
