//! View operations.

use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::{endpoints, view_path};
use crate::types::RequestOptions;
use serde_json::Value;
use std::collections::BTreeMap;

/// Handle for view operations, see [`Jenkins::views`].
#[derive(Clone, Copy)]
pub struct Views<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Views<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Views { jenkins }
    }

    /// All views keyed by name, as listed in the server status.
    pub async fn get_all(&self) -> Result<BTreeMap<String, Value>> {
        let status = self.jenkins.get_status().await?;
        let views = match status.get("views") {
            Some(Value::Array(views)) => views.clone(),
            _ => Vec::new(),
        };

        Ok(views
            .into_iter()
            .filter_map(|view| {
                let name = view.get("name")?.as_str()?.to_string();
                Some((name, view))
            })
            .collect())
    }

    /// Whether a view named `name` is listed.
    pub async fn is_exists(&self, name: &str) -> Result<bool> {
        Ok(self.get_all().await?.contains_key(name))
    }

    /// The view's `config.xml`.
    pub async fn get_config(&self, name: &str) -> Result<String> {
        self.jenkins
            .get_text(&format!("{}config.xml", view_path(name)), RequestOptions::new())
            .await
    }

    /// Create a view from a `config.xml` document.
    pub async fn create(&self, name: &str, config: &str) -> Result<()> {
        self.jenkins
            .post(
                endpoints::CREATE_VIEW,
                RequestOptions::new().query("name", name).xml(config),
            )
            .await
    }

    /// Replace the view's `config.xml`.
    pub async fn reconfigure(&self, name: &str, config: &str) -> Result<()> {
        self.jenkins
            .post(
                &format!("{}config.xml", view_path(name)),
                RequestOptions::new().xml(config),
            )
            .await
    }

    /// Delete a view.
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.jenkins
            .post(&format!("{}doDelete", view_path(name)), RequestOptions::new())
            .await
    }
}
