//! Jenkins server version parsed from the `X-Jenkins` response header.

use crate::error::{JenkinsError, Result};
use std::fmt;
use std::str::FromStr;

/// Server version as an ordered `(major, minor, patch, build)` tuple.
///
/// Missing trailing components are zero, so `"2.358"` and `"2.358.0.0"` compare
/// equal. Ordering is lexicographic over the four components, which lets callers
/// gate features with plain comparisons.
///
/// # Examples
///
/// ```
/// use jenkins_async::JenkinsVersion;
///
/// let version: JenkinsVersion = "2.346.1.4".parse().unwrap();
/// assert_eq!(version, JenkinsVersion::new(2, 346, 1, 4));
/// assert!(version >= JenkinsVersion::new(2, 129, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JenkinsVersion {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch level, `0` when absent.
    pub patch: u32,
    /// Build number, `0` when absent.
    pub build: u32,
}

impl JenkinsVersion {
    /// Create a version from its four components.
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        JenkinsVersion {
            major,
            minor,
            patch,
            build,
        }
    }
}

impl FromStr for JenkinsVersion {
    type Err = JenkinsError;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(JenkinsError::Protocol("empty version string".into()));
        }

        let mut parts = [0u32; 4];
        let mut count = 0;

        for component in trimmed.split('.') {
            if count == parts.len() {
                return Err(JenkinsError::Protocol(format!(
                    "version has more than four components: {}",
                    value
                )));
            }
            parts[count] = component.parse().map_err(|_| {
                JenkinsError::Protocol(format!("invalid version component in {}", value))
            })?;
            count += 1;
        }

        Ok(JenkinsVersion::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl fmt::Display for JenkinsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}
