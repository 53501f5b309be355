//! Jenkins wire conventions: endpoints, headers, URL paths and payload formats.
//!
//! Nothing in this module performs I/O; the request layer in [`crate::client`]
//! and the API modules in [`crate::api`] build on these helpers.

pub mod config_xml;
pub mod feed;
pub mod headers;
pub mod paths;

pub use config_xml::{escape_xml, JobConfig, JobParameter, NodeConfig, NodeMode};
pub use feed::{parse_build_feed, NodeBuild};
pub use headers::{parse_queue_location, parse_version_header};
pub use paths::{
    build_path, encode_segment, folder_and_job, folder_path, is_builtin_node, job_path,
    node_path, normalize_node_name, parse_build_url, view_path,
};

/// Well-known server endpoints.
pub mod endpoints {
    /// Crumb issuer; 404 when CSRF protection is disabled.
    pub const CRUMB_ISSUER: &str = "/crumbIssuer/api/json";
    /// Server status document.
    pub const STATUS: &str = "/api/json";
    /// Root page; carries the `X-Jenkins` header.
    pub const ROOT: &str = "/";
    /// Groovy script console.
    pub const SCRIPT_TEXT: &str = "/scriptText";
    /// Enter quiet-down mode.
    pub const QUIET_DOWN: &str = "/quietDown";
    /// Leave quiet-down mode.
    pub const CANCEL_QUIET_DOWN: &str = "/cancelQuietDown";
    /// Immediate restart.
    pub const RESTART: &str = "/restart";
    /// Restart once running builds complete.
    pub const SAFE_RESTART: &str = "/safeRestart";
    /// API token descriptor of the current user.
    pub const API_TOKEN: &str = "/me/descriptorByName/jenkins.security.ApiTokenProperty/";
    /// Node list.
    pub const COMPUTERS: &str = "/computer/api/json";
    /// Node creation.
    pub const CREATE_NODE: &str = "/computer/doCreateItem";
    /// View creation.
    pub const CREATE_VIEW: &str = "/createView";
    /// Build queue.
    pub const QUEUE: &str = "/queue/api/json";
    /// Queue cancellation.
    pub const CANCEL_QUEUE_ITEM: &str = "/queue/cancelItem";
    /// Installed plugins.
    pub const PLUGINS: &str = "/pluginManager/api/json";
}
