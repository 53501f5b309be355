//! Installed plugins.

use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::endpoints;
use crate::types::RequestOptions;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct PluginList {
    #[serde(default)]
    plugins: Vec<Value>,
}

/// Handle for plugin operations, see [`Jenkins::plugins`].
#[derive(Clone, Copy)]
pub struct Plugins<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Plugins<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Plugins { jenkins }
    }

    /// Installed plugins keyed by short name. `depth` controls how much of each
    /// plugin's details (dependencies, ...) is expanded; Jenkins' own default is 2.
    pub async fn get_all(&self, depth: u32) -> Result<BTreeMap<String, Value>> {
        let list: PluginList = self
            .jenkins
            .get_json(endpoints::PLUGINS, RequestOptions::new().query("depth", depth))
            .await?;

        Ok(list
            .plugins
            .into_iter()
            .filter_map(|plugin| {
                let name = plugin.get("shortName")?.as_str()?.to_string();
                Some((name, plugin))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::server_without_crumb;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_get_all() {
        let (mut server, _probe) = server_without_crumb().await;
        let _plugins = server
            .mock("GET", "/pluginManager/api/json")
            .match_query(Matcher::UrlEncoded("depth".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"plugins":[
                    {"shortName":"git","version":"5.2.1","active":true},
                    {"shortName":"matrix-auth","version":"3.2","active":true}
                ]}"#,
            )
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let plugins = jenkins.plugins().get_all(1).await.unwrap();
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins["git"]["version"], "5.2.1");
    }
}
