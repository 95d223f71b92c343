mod client;

pub use client::TopnDbClient;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;

use crate::domain::{Item, MonitoringTask};

/// Port consumed by the background worker. Everything the reconciliation
/// loop needs from the task/item store goes through here, which keeps the
/// loop testable against an in-memory double.
#[async_trait]
pub trait MonitoringPort: Send + Sync {
    /// Tasks due for a check.
    async fn pending_tasks(&self) -> Result<Vec<MonitoringTask>>;
    /// New items for a task, newest first.
    async fn items_to_send(&self, task: &MonitoringTask) -> Result<Vec<Item>>;
    /// Marks delivery bookkeeping for every task owned by the chat.
    async fn update_last_got_item(&self, chat_id: &str) -> Result<()>;
    /// Marks that a check happened, whether or not anything was sent.
    async fn update_last_updated(&self, task: &MonitoringTask) -> Result<()>;
}

pub struct MonitoringRepository {
    client: TopnDbClient,
    timezone: Tz,
}

impl MonitoringRepository {
    pub fn new(client: TopnDbClient, timezone: &str) -> Self {
        let timezone: Tz = timezone.parse().unwrap_or(chrono_tz::Europe::Warsaw);
        Self { client, timezone }
    }

    fn tasks_from(value: serde_json::Value) -> Vec<MonitoringTask> {
        value
            .get("tasks")
            .and_then(|tasks| tasks.as_array())
            .map(|tasks| {
                tasks
                    .iter()
                    .filter_map(|task| serde_json::from_value(task.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl MonitoringPort for MonitoringRepository {
    async fn pending_tasks(&self) -> Result<Vec<MonitoringTask>> {
        let response = self.client.get_pending_tasks().await?;
        Ok(Self::tasks_from(response))
    }

    async fn items_to_send(&self, task: &MonitoringTask) -> Result<Vec<Item>> {
        let response = self.client.get_items_to_send_for_task(task.id).await?;
        let items = response
            .get("items")
            .and_then(|items| items.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }

    async fn update_last_got_item(&self, chat_id: &str) -> Result<()> {
        // The API keys this update by task, so resolve the chat's tasks first.
        let response = self.client.get_tasks_by_chat_id(chat_id).await?;
        for task in Self::tasks_from(response) {
            self.client.update_last_got_item_timestamp(task.id).await?;
        }
        Ok(())
    }

    async fn update_last_updated(&self, task: &MonitoringTask) -> Result<()> {
        let now = Utc::now().with_timezone(&self.timezone);
        let body = serde_json::json!({ "last_updated": now.to_rfc3339() });
        self.client.update_task(task.id, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_from_skips_malformed_records() {
        let value = serde_json::json!({
            "tasks": [
                {"id": 1, "chat_id": "10", "name": "a", "url": "http://x"},
                "garbage",
                {"id": 2, "chat_id": 20, "name": "b", "url": "http://y"},
            ]
        });
        let tasks = MonitoringRepository::tasks_from(value);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].chat_id, "20");
    }
}
