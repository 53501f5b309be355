//! Server-wide operations: status, version, lifecycle, API tokens and the
//! script console.

use crate::client::Jenkins;
use crate::error::{JenkinsError, Result};
use crate::protocol::headers::VERSION;
use crate::protocol::{endpoints, parse_version_header};
use crate::types::{JenkinsVersion, RequestOptions};
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

/// A freshly generated API token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedToken {
    /// Secret to use as the password in Basic auth. Shown only once.
    pub value: String,
    /// Identifier used to revoke the token.
    pub uuid: String,
}

#[derive(Deserialize)]
struct TokenEnvelope {
    status: String,
    #[serde(default)]
    data: Option<TokenData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenData {
    token_value: String,
    token_uuid: String,
}

fn token_path(action: &str) -> String {
    format!("{}{}", endpoints::API_TOKEN, action)
}

impl Jenkins {
    /// Server status document (`/api/json`).
    pub async fn get_status(&self) -> Result<Value> {
        self.get_json(endpoints::STATUS, RequestOptions::new()).await
    }

    /// Server version from the `X-Jenkins` header of the root page.
    pub async fn get_version(&self) -> Result<JenkinsVersion> {
        let response = self
            .request(Method::GET, endpoints::ROOT, RequestOptions::new())
            .await?;
        parse_version_header(response.header(VERSION))
    }

    /// Whether the server has finished starting up.
    ///
    /// Any error, including an unreachable server, counts as not ready.
    pub async fn is_ready(&self) -> bool {
        match self.get_status().await {
            Ok(status) => status.get("mode").is_some(),
            Err(e) => {
                tracing::debug!("server not ready: {}", e);
                false
            }
        }
    }

    /// Poll [`Jenkins::is_ready`] every `interval` until it returns true.
    ///
    /// There is no upper bound; wrap the call in `tokio::time::timeout` to
    /// limit the total wait.
    pub async fn wait_until_ready(&self, interval: Duration) {
        while !self.is_ready().await {
            sleep(interval).await;
        }
    }

    /// Stop starting new builds.
    pub async fn quiet_down(&self) -> Result<()> {
        self.post(endpoints::QUIET_DOWN, RequestOptions::new()).await
    }

    /// Leave quiet-down mode.
    pub async fn cancel_quiet_down(&self) -> Result<()> {
        self.post(endpoints::CANCEL_QUIET_DOWN, RequestOptions::new()).await
    }

    /// Restart immediately.
    pub async fn restart(&self) -> Result<()> {
        self.post(endpoints::RESTART, RequestOptions::new()).await
    }

    /// Restart once running builds have finished.
    pub async fn safe_restart(&self) -> Result<()> {
        self.post(endpoints::SAFE_RESTART, RequestOptions::new()).await
    }

    /// Generate an API token named `name` for the authenticated user.
    pub async fn generate_token(&self, name: &str) -> Result<GeneratedToken> {
        let response = self
            .request(
                Method::POST,
                &token_path("generateNewToken"),
                RequestOptions::new().query("newTokenName", name),
            )
            .await?;

        let text = response.text();
        let envelope: TokenEnvelope = serde_json::from_str(&text)?;
        match envelope {
            TokenEnvelope {
                status,
                data: Some(data),
            } if status == "ok" => Ok(GeneratedToken {
                value: data.token_value,
                uuid: data.token_uuid,
            }),
            _ => Err(JenkinsError::Protocol(format!(
                "Non OK status returned: {}",
                text
            ))),
        }
    }

    /// Revoke the API token identified by `uuid` (not its value).
    pub async fn revoke_token(&self, uuid: &str) -> Result<()> {
        self.post(
            &token_path("revoke"),
            RequestOptions::new().query("tokenUuid", uuid),
        )
        .await
    }

    /// Run a Groovy script in the script console and return its output.
    pub async fn run_groovy_script(&self, script: &str) -> Result<String> {
        let response = self
            .request(
                Method::POST,
                endpoints::SCRIPT_TEXT,
                RequestOptions::new().form([("script", script)]),
            )
            .await?;
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::server_without_crumb;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_get_version() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("x-jenkins", "2.346.1.4")
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let version = jenkins.get_version().await.unwrap();
        assert_eq!(version, JenkinsVersion::new(2, 346, 1, 4));
    }

    #[tokio::test]
    async fn test_get_version_missing_header() {
        let (mut server, _probe) = server_without_crumb().await;
        let _root = server.mock("GET", "/").with_status(200).create_async().await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let err = jenkins.get_version().await.unwrap_err();
        assert!(matches!(err, JenkinsError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_is_ready() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("GET", "/api/json")
            .with_status(200)
            .with_body(r#"{"mode":"NORMAL","views":[]}"#)
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        assert!(jenkins.is_ready().await);
    }

    #[tokio::test]
    async fn test_not_ready_while_starting() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("GET", "/api/json")
            .with_status(503)
            .with_body("Please wait while Jenkins is getting ready to work")
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        assert!(!jenkins.is_ready().await);
    }

    #[tokio::test]
    async fn test_generate_and_revoke_token() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("POST", "/me/descriptorByName/jenkins.security.ApiTokenProperty/generateNewToken")
            .match_query(Matcher::UrlEncoded("newTokenName".into(), "ci".into()))
            .with_status(200)
            .with_body(r#"{"status":"ok","data":{"tokenName":"ci","tokenUuid":"u-1","tokenValue":"v-1"}}"#)
            .create_async()
            .await;
        let revoke = server
            .mock("POST", "/me/descriptorByName/jenkins.security.ApiTokenProperty/revoke")
            .match_query(Matcher::UrlEncoded("tokenUuid".into(), "u-1".into()))
            .with_status(200)
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let token = jenkins.generate_token("ci").await.unwrap();
        assert_eq!(
            token,
            GeneratedToken {
                value: "v-1".into(),
                uuid: "u-1".into()
            }
        );

        jenkins.revoke_token(&token.uuid).await.unwrap();
        revoke.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_token_error_status() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("POST", "/me/descriptorByName/jenkins.security.ApiTokenProperty/generateNewToken")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"error"}"#)
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let err = jenkins.generate_token("ci").await.unwrap_err();
        assert!(err.to_string().contains("Non OK status"));
    }

    #[tokio::test]
    async fn test_run_groovy_script() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("POST", "/scriptText")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded("script".into(), "println(1 + 1)".into()))
            .with_status(200)
            .with_body("2\n")
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        assert_eq!(jenkins.run_groovy_script("println(1 + 1)").await.unwrap(), "2\n");
    }

    #[tokio::test]
    async fn test_wait_until_ready_polls() {
        let (mut server, _probe) = server_without_crumb().await;
        let _mock = server
            .mock("GET", "/api/json")
            .with_status(200)
            .with_body(r#"{"mode":"NORMAL"}"#)
            .expect(1)
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            jenkins.wait_until_ready(Duration::from_millis(10)),
        )
        .await
        .unwrap();
    }
}
