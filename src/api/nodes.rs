//! Node (agent) operations.
//!
//! `master` and `built-in` address the controller's own node.

use crate::api::exists;
use crate::client::Jenkins;
use crate::error::{JenkinsError, Result};
use crate::protocol::{endpoints, is_builtin_node, node_path, parse_build_feed, NodeBuild, NodeConfig};
use crate::types::RequestOptions;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct ComputerList {
    #[serde(default)]
    computer: Vec<Value>,
}

/// Handle for node operations, see [`Jenkins::nodes`].
#[derive(Clone, Copy)]
pub struct Nodes<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Nodes { jenkins }
    }

    /// All nodes keyed by display name.
    pub async fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        let list: ComputerList = self
            .jenkins
            .get_json(endpoints::COMPUTERS, RequestOptions::new())
            .await?;

        Ok(list
            .computer
            .into_iter()
            .filter_map(|node| {
                let name = node.get("displayName")?.as_str()?.to_string();
                Some((name, node))
            })
            .collect())
    }

    /// Node details (`api/json`).
    pub async fn get_info(&self, name: &str) -> Result<Value> {
        self.jenkins
            .get_json(&format!("{}api/json", node_path(name)), RequestOptions::new())
            .await
    }

    /// Whether the node exists. An empty name never does.
    pub async fn is_exists(&self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        exists(self.get_info(name).await)
    }

    /// Default permanent agent description for `name`.
    pub fn construct(&self, name: &str) -> NodeConfig {
        NodeConfig::new(name)
    }

    /// Create a node. Fails with [`JenkinsError::AlreadyExists`] when a node of
    /// that name is present.
    pub async fn create(&self, config: &NodeConfig) -> Result<()> {
        if self.get_all().await?.contains_key(&config.name) {
            return Err(JenkinsError::AlreadyExists {
                kind: "Node",
                name: config.name.clone(),
            });
        }

        let options = RequestOptions::new()
            .query("name", &config.name)
            .query("type", &config.node_type)
            .query("json", config.to_json());
        self.jenkins.post(endpoints::CREATE_NODE, options).await
    }

    /// Delete a node.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.jenkins
            .post(&format!("{}doDelete", node_path(name)), RequestOptions::new())
            .await
    }

    async fn is_offline(&self, name: &str) -> Result<bool> {
        let info = self.get_info(name).await?;
        Ok(info.get("offline").and_then(Value::as_bool).unwrap_or(false))
    }

    /// Bring the node online. Does nothing when it already is.
    pub async fn enable(&self, name: &str) -> Result<()> {
        if !self.is_offline(name).await? {
            return Ok(());
        }
        self.jenkins
            .post(&format!("{}toggleOffline", node_path(name)), RequestOptions::new())
            .await
    }

    /// Take the node offline with `message` as the reason. Does nothing when it
    /// already is offline.
    pub async fn disable(&self, name: &str, message: &str) -> Result<()> {
        if self.is_offline(name).await? {
            return Ok(());
        }
        self.jenkins
            .post(
                &format!("{}toggleOffline", node_path(name)),
                RequestOptions::new().query("offlineMessage", message),
            )
            .await
    }

    /// Change the offline reason of an offline node.
    pub async fn update_offline_reason(&self, name: &str, message: &str) -> Result<()> {
        self.jenkins
            .post(
                &format!("{}changeOfflineCause", node_path(name)),
                RequestOptions::new().query("offlineMessage", message),
            )
            .await
    }

    /// The node's `config.xml`.
    pub async fn get_config(&self, name: &str) -> Result<String> {
        self.jenkins
            .get_text(&format!("{}config.xml", node_path(name)), RequestOptions::new())
            .await
    }

    /// Replace the node's `config.xml`. The built-in node has no such document.
    pub async fn reconfigure(&self, name: &str, config: &str) -> Result<()> {
        if is_builtin_node(name) {
            return Err(JenkinsError::InvalidArgument(
                "built-in node can not be reconfigured".into(),
            ));
        }
        self.jenkins
            .post(
                &format!("{}config.xml", node_path(name)),
                RequestOptions::new().xml(config),
            )
            .await
    }

    /// Builds that ran on the node, oldest first.
    pub async fn get_all_builds(&self, name: &str) -> Result<Vec<NodeBuild>> {
        self.feed(name, "rssAll").await
    }

    /// Failed builds that ran on the node, oldest first.
    pub async fn get_failed_builds(&self, name: &str) -> Result<Vec<NodeBuild>> {
        self.feed(name, "rssFailed").await
    }

    async fn feed(&self, name: &str, kind: &str) -> Result<Vec<NodeBuild>> {
        let feed = self
            .jenkins
            .get_text(&format!("{}builds/{}", node_path(name), kind), RequestOptions::new())
            .await?;
        Ok(parse_build_feed(&feed))
    }
}
