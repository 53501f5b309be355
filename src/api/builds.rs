//! Build operations.

use crate::api::{exists, QueueItem};
use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::{build_path, job_path, parse_build_url, parse_queue_location};
use crate::types::RequestOptions;
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Parameters and quiet period for a build trigger.
///
/// Parameters come from two sources: a named parameter set given with
/// [`BuildRequest::parameters`], and individual values given with
/// [`BuildRequest::parameter`]. Individual values override the set, and a later
/// value for the same name overrides an earlier one.
///
/// # Examples
///
/// ```
/// use jenkins_async::api::BuildRequest;
///
/// let request = BuildRequest::new()
///     .parameters([("BRANCH", "main"), ("DEPLOY", "false")])
///     .parameter("DEPLOY", "true");
///
/// let merged = request.merged_parameters();
/// assert_eq!(merged["BRANCH"], "main");
/// assert_eq!(merged["DEPLOY"], "true");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    set: BTreeMap<String, String>,
    overrides: Vec<(String, String)>,
    delay: u32,
}

impl BuildRequest {
    /// Trigger without parameters and without delay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named parameter set.
    #[must_use]
    pub fn parameters<K, V>(mut self, parameters: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.set
            .extend(parameters.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Add one parameter, overriding the set.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.overrides.push((name.into(), value.to_string()));
        self
    }

    /// Quiet period in seconds before the build starts.
    #[must_use]
    pub fn delay(mut self, seconds: u32) -> Self {
        self.delay = seconds;
        self
    }

    /// Parameters after applying the precedence rules.
    pub fn merged_parameters(&self) -> BTreeMap<String, String> {
        let mut merged = self.set.clone();
        for (name, value) in &self.overrides {
            merged.insert(name.clone(), value.clone());
        }
        merged
    }

    /// The `json` form field Jenkins expects, or `None` without parameters.
    ///
    /// A single parameter is sent as an object rather than a one-element list.
    fn form_json(&self) -> Option<String> {
        let merged = self.merged_parameters();
        let mut parameters: Vec<Value> = merged
            .into_iter()
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect();

        let parameter = match parameters.len() {
            0 => return None,
            1 => parameters.remove(0),
            _ => Value::Array(parameters),
        };

        Some(
            json!({
                "parameter": parameter,
                "statusCode": "303",
                "redirectTo": ".",
            })
            .to_string(),
        )
    }
}

/// Entry of a job's build list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildSummary {
    /// Build number.
    pub number: u64,
    /// Build URL as published by the server.
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildList {
    #[serde(default)]
    all_builds: Vec<BuildSummary>,
}

/// Handle for build operations, see [`Jenkins::builds`].
#[derive(Clone, Copy)]
pub struct Builds<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Builds<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Builds { jenkins }
    }

    /// Split a build URL into full job name and build number.
    pub fn parse_url(&self, build_url: &str) -> Result<(String, u64)> {
        parse_build_url(build_url)
    }

    /// Enqueue a build and return its queue item id.
    ///
    /// The id is read from the `Location` header of the unredirected response;
    /// `None` when the server did not send one.
    pub async fn start(&self, name: &str, request: BuildRequest) -> Result<Option<u64>> {
        let mut options = RequestOptions::new()
            .query("delay", request.delay)
            .no_redirects();
        if let Some(json) = request.form_json() {
            options = options.form([("json", json)]);
        }

        let response = self
            .jenkins
            .request(Method::POST, &format!("{}build", job_path(name)), options)
            .await?;

        let queue_id = response.location().and_then(parse_queue_location);
        tracing::debug!(job = name, ?queue_id, "build enqueued");
        Ok(queue_id)
    }

    /// Abort a running build.
    pub async fn stop(&self, name: &str, number: u64) -> Result<()> {
        self.jenkins
            .post(&format!("{}stop", build_path(name, number)), RequestOptions::new())
            .await
    }

    /// Delete a build.
    pub async fn delete(&self, name: &str, number: u64) -> Result<()> {
        self.jenkins
            .post(&format!("{}doDelete", build_path(name, number)), RequestOptions::new())
            .await
    }

    /// Build details (`api/json`).
    pub async fn get_info(&self, name: &str, number: u64) -> Result<Value> {
        self.jenkins
            .get_json(&format!("{}api/json", build_path(name, number)), RequestOptions::new())
            .await
    }

    /// Build details for a build URL.
    pub async fn get_url_info(&self, build_url: &str) -> Result<Value> {
        let (name, number) = self.parse_url(build_url)?;
        self.get_info(&name, number).await
    }

    /// Whether the build exists.
    pub async fn is_exists(&self, name: &str, number: u64) -> Result<bool> {
        exists(self.get_info(name, number).await)
    }

    /// All builds of a job, oldest first.
    pub async fn get_all(&self, name: &str) -> Result<Vec<BuildSummary>> {
        let list: BuildList = self
            .jenkins
            .get_json(
                &format!("{}api/json", job_path(name)),
                RequestOptions::new().query("tree", "allBuilds[number,url]"),
            )
            .await?;

        let mut builds = list.all_builds;
        builds.sort_by_key(|b| b.number);
        Ok(builds)
    }

    /// Console output.
    pub async fn get_output(&self, name: &str, number: u64) -> Result<String> {
        self.jenkins
            .get_text(&format!("{}consoleText", build_path(name, number)), RequestOptions::new())
            .await
    }

    /// Queue item details for the id returned by [`Builds::start`].
    pub async fn get_queue_id_info(&self, queue_id: u64) -> Result<QueueItem> {
        self.jenkins.queue().get_info(queue_id).await
    }
}
