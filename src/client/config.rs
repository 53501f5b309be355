//! Configuration for the Jenkins client.
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `host` | required | Server base URL; trailing slashes are stripped |
//! | `credentials` | none | Basic-auth user and password or API token |
//! | `verify` | `true` | Verify TLS certificates |
//! | `timeout` | none | Per-request timeout, in seconds when deserialized |
//! | `retry` | none | [`RetryPolicy`]; disabled unless given |
//!
//! The configuration is immutable once a client is built from it, and it is
//! validated at that point: a bad host or retry policy fails construction
//! before any connection is attempted.
//!
//! # Examples
//!
//! ```
//! use jenkins_async::client::{ClientConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("http://localhost:8080/")
//!     .with_credentials("admin", "admin")
//!     .with_timeout(Duration::from_secs(30))
//!     .with_retry(RetryPolicy::new(3).with_statuses([429]));
//! assert_eq!(config.host, "http://localhost:8080");
//!
//! let config = ClientConfig::from_json(
//!     r#"{"host": "http://ci", "timeout": 2.5, "retry": {"total": 5}}"#,
//! ).unwrap();
//! assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
//! ```

use crate::client::retry::RetryPolicy;
use crate::error::{JenkinsError, Result};
use crate::types::Credentials;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

/// Environment variable holding the server URL.
pub const ENV_URL: &str = "JENKINS_URL";
/// Environment variable holding the user name.
pub const ENV_USER: &str = "JENKINS_USER";
/// Environment variable holding the password or API token.
pub const ENV_PASSWORD: &str = "JENKINS_PASSWORD";
/// Environment variable holding the timeout in seconds.
pub const ENV_TIMEOUT: &str = "JENKINS_TIMEOUT";

/// Host used by [`ClientConfig::default`].
pub const DEFAULT_HOST: &str = "http://localhost:8080";

/// Client configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Server base URL without trailing slash.
    #[serde(deserialize_with = "deserialize_host")]
    pub host: String,

    /// Basic-auth credentials.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Verify TLS certificates.
    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Per-request timeout.
    #[serde(default, deserialize_with = "deserialize_timeout")]
    pub timeout: Option<Duration>,

    /// Retry policy; `None` disables retries.
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
}

fn default_verify() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(DEFAULT_HOST)
    }
}

fn deserialize_host<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let host = String::deserialize(deserializer)?;
    Ok(normalize_host(&host))
}

fn deserialize_timeout<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Duration>, D::Error> {
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(seconds) => Duration::try_from_secs_f64(seconds)
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid timeout: {}", seconds))),
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}

impl ClientConfig {
    /// Configuration for `host` with all defaults.
    pub fn new(host: impl AsRef<str>) -> Self {
        ClientConfig {
            host: normalize_host(host.as_ref()),
            credentials: None,
            verify: default_verify(),
            timeout: None,
            retry: None,
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| JenkinsError::Config(format!("invalid client configuration: {}", e)))
    }

    /// Read `JENKINS_URL`, `JENKINS_USER`, `JENKINS_PASSWORD` and `JENKINS_TIMEOUT`.
    ///
    /// Credentials are used only when both user and password are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(ENV_URL)
            .ok_or_else(|| JenkinsError::Config(format!("{} is not set", ENV_URL)))?;
        let mut config = ClientConfig::new(host);

        if let (Some(user), Some(password)) = (lookup(ENV_USER), lookup(ENV_PASSWORD)) {
            config = config.with_credentials(user, password);
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            let timeout = raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|s| Duration::try_from_secs_f64(s).ok())
                .ok_or_else(|| JenkinsError::Config(format!("invalid {}: {}", ENV_TIMEOUT, raw)))?;
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }

    /// Authenticate with `username` and `password` (or API token).
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable retries.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Check the host and retry policy.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.host)
            .map_err(|e| JenkinsError::Config(format!("invalid host {:?}: {}", self.host, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(JenkinsError::Config(format!(
                "unsupported scheme in host {:?}",
                self.host
            )));
        }

        if let Some(retry) = &self.retry {
            retry.validate()?;
        }

        Ok(())
    }
}
