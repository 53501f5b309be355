#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # jenkins_async: an asynchronous Jenkins REST client
//!
//! The crate is split in two layers. The request layer owns everything a Jenkins
//! call needs besides its path: credentials, the CSRF crumb, session cookies,
//! retries and the transport itself. The domain layer is a set of thin handles
//! (jobs, builds, nodes, views, queue, plugins) that turn operations into paths
//! and payloads and hand them to the request layer.
//!
//! ## Request lifecycle
//!
//! Every call made through [`Jenkins::request`] goes through the same steps:
//!
//! 1. The crumb is resolved once per client: probed from
//!    `/crumbIssuer/api/json`, cached, or remembered as unsupported.
//! 2. Authentication, crumb, cookie and content-type headers are added unless
//!    the caller already set them.
//! 3. The request is sent through the session transport, optionally wrapped in
//!    a [`RetryPolicy`].
//! 4. A status of 400 or above becomes a [`JenkinsError`]. A 403 sent with a
//!    cached crumb refreshes the crumb and is retried exactly once.
//!
//! ## Usage
//!
//! ```no_run
//! use jenkins_async::{BuildRequest, Jenkins};
//!
//! # async fn run() -> jenkins_async::Result<()> {
//! let jenkins = Jenkins::builder("http://localhost:8080")
//!     .credentials("admin", "api-token")
//!     .build()?;
//!
//! let version = jenkins.get_version().await?;
//! println!("connected to Jenkins {}", version);
//!
//! let queue_id = jenkins
//!     .builds()
//!     .start("team/app", BuildRequest::new().parameter("BRANCH", "main"))
//!     .await?;
//! println!("queued as {:?}", queue_id);
//!
//! jenkins.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - **[client]** - Client handle, session, transport, retries and crumb handling
//! - **[api]** - Domain operations on jobs, builds, nodes, views, queue and plugins
//! - **[types]** - Request options, responses and versions
//! - **[error]** - Error type and result alias
//! - **[protocol]** - Paths, endpoints, header and feed parsing, config documents

pub mod api;
pub mod client;
pub mod error;
pub mod protocol;
pub mod types;

pub use api::BuildRequest;
pub use client::{ClientConfig, Crumb, Jenkins, JenkinsBuilder, RetryPolicy};
pub use error::{JenkinsError, Result};
pub use types::{AuthOverride, Body, Credentials, JenkinsVersion, RequestOptions, Response};

#[cfg(test)]
mod tests;
