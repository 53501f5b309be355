//! URL path construction for Jenkins resources.
//!
//! Jobs inside folders are addressed by repeating `/job/<segment>` for every
//! folder level, so `team/app/deploy` lives at `/job/team/job/app/job/deploy/`.
//! Nodes live under `/computer/<name>/`, where the built-in controller node
//! uses a bracketed alias. Views live under `/view/<name>/`.

use crate::error::{JenkinsError, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters escaped in a path segment: everything except unreserved
/// characters and RFC 3986 sub-delimiters, so the bracketed built-in node name
/// stays readable.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Percent-encode a single path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Split a full job name into its folder prefix (`job/a/job/b/`) and the job name.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::folder_and_job;
///
/// assert_eq!(folder_and_job("app"), (String::new(), "app"));
/// assert_eq!(folder_and_job("team/app"), ("job/team/".to_string(), "app"));
/// ```
pub fn folder_and_job(name: &str) -> (String, &str) {
    let (folders, job) = match name.rsplit_once('/') {
        Some((folders, job)) => (folders, job),
        None => return (String::new(), name),
    };

    let prefix = folders
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|folder| format!("job/{}/", encode_segment(folder)))
        .collect();

    (prefix, job)
}

/// Absolute path of a job, with a trailing slash.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::job_path;
///
/// assert_eq!(job_path("app"), "/job/app/");
/// assert_eq!(job_path("team/app"), "/job/team/job/app/");
/// ```
pub fn job_path(name: &str) -> String {
    let (folder, job) = folder_and_job(name);
    format!("/{}job/{}/", folder, encode_segment(job))
}

/// Absolute path of the folder containing a job (`/` for top-level jobs).
pub fn folder_path(name: &str) -> String {
    let (folder, _) = folder_and_job(name);
    format!("/{}", folder)
}

/// Absolute path of a build of a job.
pub fn build_path(name: &str, number: u64) -> String {
    format!("{}{}/", job_path(name), number)
}

/// Map the built-in controller node to the bracketed name Jenkins uses in URLs.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::normalize_node_name;
///
/// assert_eq!(normalize_node_name("master"), "(master)");
/// assert_eq!(normalize_node_name("built-in"), "(built-in)");
/// assert_eq!(normalize_node_name("agent-1"), "agent-1");
/// ```
pub fn normalize_node_name(name: &str) -> &str {
    match name {
        "master" => "(master)",
        "built-in" => "(built-in)",
        other => other,
    }
}

/// Whether the name refers to the built-in controller node.
pub fn is_builtin_node(name: &str) -> bool {
    matches!(name, "master" | "(master)" | "built-in" | "(built-in)")
}

/// Absolute path of a node.
pub fn node_path(name: &str) -> String {
    format!("/computer/{}/", encode_segment(normalize_node_name(name)))
}

/// Absolute path of a view.
pub fn view_path(name: &str) -> String {
    format!("/view/{}/", encode_segment(name))
}

/// Split a build URL into the full job name and build number.
///
/// Anything after the build number (`console`, `api/json`, ...) is ignored.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::parse_build_url;
///
/// let (name, number) =
///     parse_build_url("http://localhost:8080/job/folder/job/app/567/console").unwrap();
/// assert_eq!(name, "folder/app");
/// assert_eq!(number, 567);
/// assert!(parse_build_url("xxx").is_err());
/// ```
pub fn parse_build_url(build_url: &str) -> Result<(String, u64)> {
    let invalid = || JenkinsError::Protocol(format!("Invalid build URL: {}", build_url));

    let parsed = Url::parse(build_url).map_err(|_| invalid())?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|s| !s.is_empty())
        .collect();

    let mut names = Vec::new();
    let mut index = 0;
    while index + 1 < segments.len() && segments[index] == "job" {
        names.push(percent_decode_str(segments[index + 1]).decode_utf8_lossy().into_owned());
        index += 2;
    }

    if names.is_empty() {
        return Err(invalid());
    }

    let number = segments
        .get(index)
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(invalid)?;

    Ok((names.join("/"), number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_job_path() {
        assert_eq!(job_path("a/b/c"), "/job/a/job/b/job/c/");
        assert_eq!(folder_path("a/b/c"), "/job/a/job/b/");
        assert_eq!(folder_path("c"), "/");
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(job_path("my job"), "/job/my%20job/");
        assert_eq!(encode_segment("a#b"), "a%23b");
        assert_eq!(encode_segment("50%"), "50%25");
        assert_eq!(encode_segment("ünï"), "%C3%BCn%C3%AF");
        assert_eq!(node_path("built-in"), "/computer/(built-in)/");
    }

    #[test]
    fn test_build_path() {
        assert_eq!(build_path("app", 12), "/job/app/12/");
    }

    #[test]
    fn test_node_path() {
        assert_eq!(node_path("master"), "/computer/(master)/");
        assert_eq!(node_path("agent"), "/computer/agent/");
        assert!(is_builtin_node("(built-in)"));
        assert!(!is_builtin_node("agent"));
    }

    #[test]
    fn test_parse_build_url() {
        let (name, number) = parse_build_url("http://localhost:8080/job/jobbb/1/console").unwrap();
        assert_eq!(name, "jobbb");
        assert_eq!(number, 1);
    }

    #[test]
    fn test_parse_build_url_decodes_names() {
        let (name, number) = parse_build_url("http://ci/job/my%20job/3/").unwrap();
        assert_eq!(name, "my job");
        assert_eq!(number, 3);

        let url = format!("http://ci{}", build_path("team/ünï #1", 9));
        assert_eq!(parse_build_url(&url).unwrap(), ("team/ünï #1".to_string(), 9));
    }

    #[test]
    fn test_parse_build_url_rejects_job_url() {
        assert!(parse_build_url("http://ci/job/app/").is_err());
        assert!(parse_build_url("http://ci/view/all/").is_err());
        assert!(parse_build_url("xxx").is_err());
    }
}
