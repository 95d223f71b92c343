use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::TopnDbConfig;

/// Thin JSON client for the Topn DB API, the remote store that owns
/// monitoring tasks and scraped items.
#[derive(Clone)]
pub struct TopnDbClient {
    http: Client,
    base_url: String,
}

impl TopnDbClient {
    pub fn new(http: Client, config: TopnDbConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get_pending_tasks(&self) -> Result<Value> {
        self.get("/api/v1/tasks/pending").await
    }

    pub async fn get_tasks_by_chat_id(&self, chat_id: &str) -> Result<Value> {
        self.get(&format!("/api/v1/tasks/chat/{chat_id}")).await
    }

    pub async fn get_items_to_send_for_task(&self, task_id: i64) -> Result<Value> {
        self.get(&format!("/api/v1/tasks/{task_id}/items-to-send"))
            .await
    }

    pub async fn update_last_got_item_timestamp(&self, task_id: i64) -> Result<Value> {
        let url = format!(
            "{}/api/v1/tasks/{task_id}/update-last-got-item",
            self.base_url
        );
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()?;
        read_body(response).await
    }

    pub async fn update_task(&self, task_id: i64, body: &Value) -> Result<Value> {
        let url = format!("{}/api/v1/tasks/{task_id}", self.base_url);
        let response = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?
            .error_for_status()?;
        read_body(response).await
    }

    async fn get(&self, endpoint: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(target: "topn_db", %url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<Value> {
    if response.status() == reqwest::StatusCode::NO_CONTENT {
        return Ok(serde_json::json!({"success": true}));
    }
    response.json().await.context("invalid JSON response body")
}
