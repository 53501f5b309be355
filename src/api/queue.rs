//! Build queue operations.

use crate::client::Jenkins;
use crate::error::Result;
use crate::protocol::endpoints;
use crate::types::RequestOptions;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Job a queue item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueTask {
    /// Job name.
    #[serde(default)]
    pub name: String,
    /// Job URL.
    #[serde(default)]
    pub url: String,
}

/// A pending build.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Queue item id, valid until the build starts.
    pub id: u64,
    /// Why the item is still waiting.
    #[serde(default)]
    pub why: Option<String>,
    /// Blocked by another build.
    #[serde(default)]
    pub blocked: bool,
    /// Ready to run once an executor is free.
    #[serde(default)]
    pub buildable: bool,
    /// Waiting for an executor for too long.
    #[serde(default)]
    pub stuck: bool,
    /// Set once the item was cancelled.
    #[serde(default)]
    pub cancelled: Option<bool>,
    /// Milliseconds since the epoch at which the item entered the queue.
    #[serde(default)]
    pub in_queue_since: Option<u64>,
    /// Owning job.
    #[serde(default)]
    pub task: Option<QueueTask>,
    /// The started build (`number`, `url`) once the item left the queue.
    #[serde(default)]
    pub executable: Option<Value>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueueItem {
    /// Build number once the item has started.
    pub fn build_number(&self) -> Option<u64> {
        self.executable.as_ref()?.get("number")?.as_u64()
    }
}

#[derive(Deserialize)]
struct QueueList {
    #[serde(default)]
    items: Vec<QueueItem>,
}

/// Handle for queue operations, see [`Jenkins::queue`].
#[derive(Clone, Copy)]
pub struct Queue<'a> {
    jenkins: &'a Jenkins,
}

impl<'a> Queue<'a> {
    pub(crate) fn new(jenkins: &'a Jenkins) -> Self {
        Queue { jenkins }
    }

    /// All queued items keyed by id.
    pub async fn get_all(&self) -> Result<BTreeMap<u64, QueueItem>> {
        let list: QueueList = self
            .jenkins
            .get_json(endpoints::QUEUE, RequestOptions::new())
            .await?;
        Ok(list.items.into_iter().map(|item| (item.id, item)).collect())
    }

    /// One queue item. Items disappear some time after their build started.
    pub async fn get_info(&self, id: u64) -> Result<QueueItem> {
        self.jenkins
            .get_json(&format!("/queue/item/{}/api/json", id), RequestOptions::new())
            .await
    }

    /// Remove an item from the queue.
    pub async fn cancel(&self, id: u64) -> Result<()> {
        self.jenkins
            .post(endpoints::CANCEL_QUEUE_ITEM, RequestOptions::new().query("id", id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::server_without_crumb;
    use mockito::Matcher;

    const QUEUE: &str = r#"{"_class":"hudson.model.Queue","items":[
        {"_class":"hudson.model.Queue$WaitingItem","id":12,"blocked":false,"buildable":false,
         "stuck":false,"inQueueSince":1700000000000,"why":"In the quiet period",
         "task":{"name":"app","url":"http://ci/job/app/"}},
        {"_class":"hudson.model.Queue$BuildableItem","id":13,"blocked":false,"buildable":true,
         "stuck":false,"task":{"name":"lib","url":"http://ci/job/lib/"}}
    ]}"#;

    #[test]
    fn test_queue_item_shape() {
        let list: QueueList = serde_json::from_str(QUEUE).unwrap();
        let item = &list.items[0];
        assert_eq!(item.id, 12);
        assert_eq!(item.why.as_deref(), Some("In the quiet period"));
        assert_eq!(item.task.as_ref().unwrap().name, "app");
        assert_eq!(item.extra["_class"], "hudson.model.Queue$WaitingItem");
        assert_eq!(item.build_number(), None);
    }

    #[test]
    fn test_build_number_after_start() {
        let item: QueueItem =
            serde_json::from_str(r#"{"id":1,"executable":{"number":7,"url":"http://ci/job/app/7/"}}"#)
                .unwrap();
        assert_eq!(item.build_number(), Some(7));
    }

    #[tokio::test]
    async fn test_get_all_and_cancel() {
        let (mut server, _probe) = server_without_crumb().await;
        let _queue = server
            .mock("GET", "/queue/api/json")
            .with_status(200)
            .with_body(QUEUE)
            .create_async()
            .await;
        let cancel = server
            .mock("POST", "/queue/cancelItem")
            .match_query(Matcher::UrlEncoded("id".into(), "12".into()))
            .with_status(302)
            .with_header("location", "/queue/")
            .create_async()
            .await;
        let _after = server
            .mock("GET", "/queue/")
            .with_status(200)
            .create_async()
            .await;

        let jenkins = Jenkins::new(server.url()).unwrap();
        let items = jenkins.queue().get_all().await.unwrap();
        assert_eq!(items.keys().copied().collect::<Vec<_>>(), [12, 13]);
        assert!(items[&13].buildable);

        jenkins.queue().cancel(12).await.unwrap();
        cancel.assert_async().await;
    }
}
