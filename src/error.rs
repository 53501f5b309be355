//! Error types for Jenkins API operations.
//!
//! Every fallible operation in this crate returns [`Result`], whose error side is
//! [`JenkinsError`]. The variants follow the way a caller reacts to them:
//!
//! | Category | Variants | Typical reaction |
//! |----------|----------|------------------|
//! | Missing resource | `NotFound` | Existence checks turn it into `false` |
//! | Rejected request | `Http` | Inspect `status()` and the embedded body |
//! | Network | `Transport` | Retry later, or configure a [`RetryPolicy`] |
//! | Setup | `Config` | Fix the client configuration |
//! | Unexpected payload | `Protocol`, `Json` | Usually a server/version mismatch |
//! | Caller mistake | `AlreadyExists`, `InvalidArgument` | Change the arguments |
//! | Lifecycle | `Closed` | Build a new client |
//!
//! `NotFound` is the distinguished form of a client error: [`JenkinsError::status`]
//! reports `404` for it just as it reports the numeric status of `Http`.
//!
//! # Examples
//!
//! ```
//! use jenkins_async::JenkinsError;
//!
//! let err = JenkinsError::NotFound { message: "Request error [404], ".into() };
//! assert!(err.is_not_found());
//! assert_eq!(err.status(), Some(404));
//! ```
//!
//! [`RetryPolicy`]: crate::client::RetryPolicy

use thiserror::Error;

/// Result type for Jenkins operations.
pub type Result<T> = std::result::Result<T, JenkinsError>;

/// Errors that can occur while talking to a Jenkins server.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum JenkinsError {
    /// The server answered `404 Not Found`.
    #[error("{message}")]
    NotFound {
        /// Formatted message including the response body.
        message: String,
    },

    /// The server answered with a status `>= 400` other than 404.
    ///
    /// For 401, 403 and 500 the message flags a probable authentication problem.
    #[error("{message}")]
    Http {
        /// Numeric HTTP status.
        status: u16,
        /// Formatted message including the response body.
        message: String,
    },

    /// Connection, DNS or timeout failure, after any configured retries.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid client configuration, raised at construction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server responded with something this client cannot interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The resource to create already exists.
    #[error("{kind} `{name}` already exists")]
    AlreadyExists {
        /// Resource kind, such as `Node`.
        kind: &'static str,
        /// Resource name.
        name: String,
    },

    /// The operation is not allowed for the given arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The client session was closed.
    #[error("Client session is closed")]
    Closed,
}

impl JenkinsError {
    /// HTTP status carried by the error, if the server produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            JenkinsError::NotFound { .. } => Some(404),
            JenkinsError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is the `404 Not Found` signal.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, JenkinsError::NotFound { .. })
    }

    /// Whether the server answered 401 or 403.
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Build the error for a failed response, formatting the message the way
    /// Jenkins users expect to read it.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        if status == 404 {
            return JenkinsError::NotFound {
                message: format!("Request error [{}], {}", status, body),
            };
        }

        let details = if matches!(status, 401 | 403 | 500) {
            format!("probably authentication problem:\n{}", body)
        } else {
            format!("\n{}", body)
        };

        JenkinsError::Http {
            status,
            message: format!("Request error [{}], {}", status, details),
        }
    }
}
