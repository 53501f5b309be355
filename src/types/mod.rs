//! Data types shared by the request layer and the API modules.

mod request;
mod response;
mod version;

pub use request::{AuthOverride, Body, Credentials, RequestOptions};
pub use response::Response;
pub use version::JenkinsVersion;
