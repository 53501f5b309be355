//! Atom feed parsing for build history.
//!
//! Jenkins publishes per-node build history only as Atom feeds
//! (`/computer/<name>/builds/rssAll`, `.../rssFailed`). Each `<entry>` links to
//! a build URL, from which the job name and build number are recovered.

use crate::protocol::paths::parse_build_url;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A build listed in a history feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeBuild {
    /// Full job name, including folders.
    pub job_name: String,
    /// Build number.
    pub number: u64,
    /// Build URL as published by the server.
    pub url: String,
}

/// Parse the entries of an Atom build feed, oldest first.
///
/// Jenkins lists the newest build first; the order is reversed so the most recent
/// build is last. Entries without a parsable build link are skipped with a
/// debug event.
///
/// # Examples
///
/// ```
/// use jenkins_async::protocol::parse_build_feed;
///
/// let feed = r#"<feed><entry><title>app #2</title>
///   <link rel="alternate" type="text/html" href="http://ci/job/app/2/"/></entry>
///   <entry><title>app #1</title>
///   <link rel="alternate" type="text/html" href="http://ci/job/app/1/"/></entry></feed>"#;
///
/// let builds = parse_build_feed(feed);
/// assert_eq!(builds.len(), 2);
/// assert_eq!(builds[1].number, 2);
/// ```
pub fn parse_build_feed(feed: &str) -> Vec<NodeBuild> {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    static LINK: OnceLock<Regex> = OnceLock::new();

    let entry_re =
        ENTRY.get_or_init(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("entry pattern is valid"));
    let link_re = LINK.get_or_init(|| {
        Regex::new(r#"<link\b[^>]*\bhref="([^"]+)""#).expect("link pattern is valid")
    });

    let mut builds = Vec::new();

    for entry in entry_re.captures_iter(feed) {
        let Some(body) = entry.get(1) else { continue };
        let Some(href) = link_re.captures(body.as_str()).and_then(|c| c.get(1)) else {
            tracing::debug!("feed entry without link, skipping");
            continue;
        };

        let url = unescape_xml(href.as_str());
        match parse_build_url(&url) {
            Ok((job_name, number)) => builds.push(NodeBuild {
                job_name,
                number,
                url,
            }),
            Err(e) => tracing::debug!("skipping feed entry {}: {}", url, e),
        }
    }

    builds.reverse();
    builds
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
