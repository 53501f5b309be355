//! Header names and header-value parsing for the Jenkins HTTP API.
//!
//! | Header | Direction | Meaning |
//! |--------|-----------|---------|
//! | `X-Jenkins` | response | Server version, `major.minor[.patch[.build]]` |
//! | `Jenkins-Crumb` (default) | request | Anti-CSRF token; the real name comes from the crumb issuer |
//! | `Location` | response | Queue item created by a build trigger |
//! | `Set-Cookie` / `Cookie` | both | Session continuity for crumb validity |

use crate::error::{JenkinsError, Result};
use crate::types::JenkinsVersion;
use regex::Regex;
use std::sync::OnceLock;

/// Response header carrying the server version.
pub const VERSION: &str = "X-Jenkins";

/// Crumb header name used by stock Jenkins installations.
pub const DEFAULT_CRUMB_FIELD: &str = "Jenkins-Crumb";

/// Parse the `X-Jenkins` header value.
///
/// A missing or empty header is a protocol error: every Jenkins since 1.x sends it.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::parse_version_header;
///
/// let version = parse_version_header(Some("2.358")).unwrap();
/// assert_eq!((version.major, version.minor, version.patch, version.build), (2, 358, 0, 0));
/// assert!(parse_version_header(None).is_err());
/// ```
pub fn parse_version_header(value: Option<&str>) -> Result<JenkinsVersion> {
    match value {
        Some(v) if !v.trim().is_empty() => v.parse(),
        _ => Err(JenkinsError::Protocol(format!(
            "Header `{}` isn't found in response",
            VERSION
        ))),
    }
}

/// Extract the queue item id from a build trigger's `Location` header.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::parse_queue_location;
///
/// assert_eq!(parse_queue_location("http://ci/queue/item/42/"), Some(42));
/// assert_eq!(parse_queue_location("http://ci/job/x/"), None);
/// ```
pub fn parse_queue_location(location: &str) -> Option<u64> {
    static QUEUE_ITEM: OnceLock<Regex> = OnceLock::new();
    let re = QUEUE_ITEM.get_or_init(|| {
        Regex::new(r"/queue/item/(\d+)/?$").expect("queue item pattern is valid")
    });

    re.captures(location.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
