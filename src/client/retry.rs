//! Retry policy and the retrying transport decorator.
//!
//! A [`RetryPolicy`] re-issues a request up to `total` times when the transport
//! fails (connection refused, DNS, timeout) or when the server answers with a
//! retryable status: any 5xx, plus the extra statuses configured by the caller.
//! Other transport failures (invalid request, redirect loop, unreadable body)
//! are returned at once.
//!
//! The delay before the retry that follows attempt `i` (1-based) is
//! `factor * 2^(i - 1)` seconds, so with the default factor of 1 the client waits
//! 1s, 2s, 4s, ... No delay follows the final attempt.
//!
//! # Examples
//!
//! ```
//! use jenkins_async::client::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(5).with_factor(0.5).with_statuses([429]);
//! assert!(policy.validate().is_ok());
//! assert!(policy.is_retryable_status(503));
//! assert!(policy.is_retryable_status(429));
//! assert!(!policy.is_retryable_status(404));
//! assert_eq!(policy.backoff(3), Duration::from_secs(2));
//!
//! // Unknown keys are rejected rather than ignored.
//! let err = RetryPolicy::from_json(r#"{"total": 3, "attempts": 5}"#).unwrap_err();
//! assert!(err.to_string().contains("attempts"));
//! ```

use crate::client::transport::{Transport, TransportError, TransportRequest};
use crate::error::{JenkinsError, Result};
use crate::types::Response;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawRetryPolicy")]
pub struct RetryPolicy {
    total: u32,
    factor: f64,
    statuses: Vec<u16>,
}

/// Wire form of [`RetryPolicy`], validated on conversion.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRetryPolicy {
    total: u32,
    #[serde(default = "default_factor")]
    factor: f64,
    #[serde(default)]
    statuses: Vec<u16>,
}

fn default_factor() -> f64 {
    1.0
}

impl TryFrom<RawRetryPolicy> for RetryPolicy {
    type Error = JenkinsError;

    fn try_from(raw: RawRetryPolicy) -> Result<Self> {
        let policy = RetryPolicy {
            total: raw.total,
            factor: raw.factor,
            statuses: raw.statuses,
        };
        policy.validate()?;
        Ok(policy)
    }
}

impl RetryPolicy {
    /// Policy making at most `total` attempts, with factor 1 and no extra statuses.
    ///
    /// `total` must be positive; [`RetryPolicy::validate`] rejects zero.
    pub fn new(total: u32) -> Self {
        RetryPolicy {
            total,
            factor: default_factor(),
            statuses: Vec::new(),
        }
    }

    /// Parse and validate a policy from JSON such as
    /// `{"total": 10, "factor": 1, "statuses": [500]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| JenkinsError::Config(format!("invalid retry argument: {}", e)))
    }

    /// Backoff factor in seconds.
    #[must_use]
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Additional statuses to retry on; 5xx statuses are always retried.
    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        for status in statuses {
            if !self.statuses.contains(&status) {
                self.statuses.push(status);
            }
        }
        self
    }

    /// Maximum number of attempts.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Backoff factor in seconds.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Extra retryable statuses.
    pub fn statuses(&self) -> &[u16] {
        &self.statuses
    }

    /// Check the policy before it is used.
    pub fn validate(&self) -> Result<()> {
        if self.total == 0 {
            return Err(JenkinsError::Config(
                "Invalid `total` in retry argument must be > 0".into(),
            ));
        }
        if !self.factor.is_finite() || self.factor < 0.0 {
            return Err(JenkinsError::Config(format!(
                "Invalid `factor` in retry argument: {}",
                self.factor
            )));
        }
        Ok(())
    }

    /// Whether a response with this status should be retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        (500..600).contains(&status) || self.statuses.contains(&status)
    }

    /// Delay before the retry that follows the 1-based `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(30) as i32;
        let seconds = self.factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }
}

/// Transport decorator applying a [`RetryPolicy`].
///
/// Transparent substitute for the transport it wraps: exhausting the attempts on
/// retryable statuses returns the last response unmodified, so the normal status
/// classification still applies. Exhausting them on transport failures returns
/// the last failure.
pub struct RetryingTransport {
    inner: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryingTransport {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        RetryingTransport { inner, policy }
    }

    /// The policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl Transport for RetryingTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<Response, TransportError> {
        let total = self.policy.total.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.send(request.clone()).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if !self.policy.is_retryable_status(status) || attempt == total {
                        return Ok(response);
                    }
                    tracing::warn!(
                        "Request to {} returned {} (attempt {}/{}), retrying",
                        request.url,
                        status,
                        attempt,
                        total
                    );
                }
                Err(e @ TransportError::Other(_)) => return Err(e),
                Err(e) => {
                    if attempt == total {
                        tracing::warn!("Giving up on {} after {} attempts: {}", request.url, total, e);
                        return Err(e);
                    }
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}), retrying: {}",
                        request.url,
                        attempt,
                        total,
                        e
                    );
                }
            }

            let delay = self.policy.backoff(attempt);
            if !delay.is_zero() {
                sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn close(&self) {
        self.inner.close().await;
    }
}
