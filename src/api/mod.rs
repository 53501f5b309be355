//! Typed operations over Jenkins resources.
//!
//! Each accessor on [`Jenkins`] returns a lightweight handle borrowing the
//! client. Every operation maps onto one or two calls through
//! [`Jenkins::request`], so crumbs, cookies, retries and error classification
//! apply uniformly.
//!
//! | Accessor | Handle | Resources |
//! |----------|--------|-----------|
//! | [`Jenkins::jobs`] | [`Jobs`] | Jobs and folders |
//! | [`Jenkins::builds`] | [`Builds`] | Builds of a job |
//! | [`Jenkins::nodes`] | [`Nodes`] | Agents and the built-in node |
//! | [`Jenkins::views`] | [`Views`] | List views |
//! | [`Jenkins::queue`] | [`Queue`] | Build queue |
//! | [`Jenkins::plugins`] | [`Plugins`] | Installed plugins |
//!
//! # Examples
//!
//! ```no_run
//! use jenkins_async::Jenkins;
//! use jenkins_async::api::BuildRequest;
//!
//! # async fn run() -> jenkins_async::Result<()> {
//! let jenkins = Jenkins::builder("http://localhost:8080")
//!     .credentials("admin", "admin")
//!     .build()?;
//!
//! if !jenkins.jobs().is_exists("nightly").await? {
//!     let config = jenkins.jobs().construct_config(
//!         &jenkins_async::protocol::JobConfig::new().with_command("make test"),
//!     );
//!     jenkins.jobs().create("nightly", &config).await?;
//! }
//!
//! let queue_id = jenkins
//!     .builds()
//!     .start("nightly", BuildRequest::new().parameter("BRANCH", "main"))
//!     .await?;
//! println!("queued as {:?}", queue_id);
//! # Ok(())
//! # }
//! ```

mod builds;
mod jobs;
mod nodes;
mod plugins;
mod queue;
mod views;

pub use builds::{BuildRequest, BuildSummary, Builds};
pub use jobs::{JobSummary, Jobs};
pub use nodes::Nodes;
pub use plugins::Plugins;
pub use queue::{Queue, QueueItem, QueueTask};
pub use views::Views;

use crate::client::Jenkins;
use crate::error::{JenkinsError, Result};

impl Jenkins {
    /// Job operations.
    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    /// Build operations.
    pub fn builds(&self) -> Builds<'_> {
        Builds::new(self)
    }

    /// Node operations.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// View operations.
    pub fn views(&self) -> Views<'_> {
        Views::new(self)
    }

    /// Build queue operations.
    pub fn queue(&self) -> Queue<'_> {
        Queue::new(self)
    }

    /// Plugin operations.
    pub fn plugins(&self) -> Plugins<'_> {
        Plugins::new(self)
    }
}

/// Turn a 404 into `false` and success into `true`.
pub(crate) fn exists<T>(result: Result<T>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(JenkinsError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
