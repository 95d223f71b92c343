//! Recording doubles shared by the notifier tests.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    cache::PhotoCache,
    domain::{Item, MonitoringTask},
    notifier::delivery::ImageFetcher,
    repository::MonitoringPort,
    telegram::Messenger,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SendRecord {
    Text {
        chat_id: String,
        text: String,
    },
    PhotoUrl {
        chat_id: String,
        url: String,
        caption: String,
        markdown: bool,
    },
    PhotoHandle {
        chat_id: String,
        handle: String,
    },
    PhotoBytes {
        chat_id: String,
        len: usize,
    },
}

/// Messenger double whose failure modes are toggled per test.
#[derive(Default)]
pub struct ScriptedMessenger {
    pub records: Mutex<Vec<SendRecord>>,
    pub fail_text: bool,
    pub fail_photo_url: bool,
    pub fail_photo_handle: bool,
    pub fail_photo_bytes: bool,
    pub url_handle: Option<String>,
    pub bytes_handle: Option<String>,
}

impl ScriptedMessenger {
    pub fn sends(&self) -> Vec<SendRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()> {
        self.records.lock().push(SendRecord::Text {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
        if self.fail_text {
            return Err(anyhow!("scripted text failure"));
        }
        Ok(())
    }

    async fn send_photo_url(
        &self,
        chat_id: &str,
        image_url: &str,
        caption: &str,
        markdown: bool,
    ) -> Result<Option<String>> {
        self.records.lock().push(SendRecord::PhotoUrl {
            chat_id: chat_id.to_string(),
            url: image_url.to_string(),
            caption: caption.to_string(),
            markdown,
        });
        if self.fail_photo_url {
            return Err(anyhow!("scripted photo-url failure"));
        }
        Ok(self.url_handle.clone())
    }

    async fn send_photo_by_handle(
        &self,
        chat_id: &str,
        handle: &str,
        _caption: &str,
    ) -> Result<()> {
        self.records.lock().push(SendRecord::PhotoHandle {
            chat_id: chat_id.to_string(),
            handle: handle.to_string(),
        });
        if self.fail_photo_handle {
            return Err(anyhow!("scripted handle rejection"));
        }
        Ok(())
    }

    async fn send_photo_bytes(
        &self,
        chat_id: &str,
        bytes: Vec<u8>,
        _caption: &str,
    ) -> Result<Option<String>> {
        self.records.lock().push(SendRecord::PhotoBytes {
            chat_id: chat_id.to_string(),
            len: bytes.len(),
        });
        if self.fail_photo_bytes {
            return Err(anyhow!("scripted photo-bytes failure"));
        }
        Ok(self.bytes_handle.clone())
    }
}

/// In-memory photo cache that records every mutation.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
    sets: Mutex<Vec<(String, String, u64)>>,
    deletes: Mutex<Vec<String>>,
}

impl MemoryCache {
    pub fn seed(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    pub fn set_calls(&self) -> Vec<(String, String, u64)> {
        self.sets.lock().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.deletes.lock().clone()
    }
}

#[async_trait]
impl PhotoCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        self.sets
            .lock()
            .push((key.to_string(), value.to_string(), ttl_seconds));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        self.deletes.lock().push(key.to_string());
        Ok(())
    }
}

/// Fetch layer double returning a fixed payload.
pub struct ScriptedFetcher {
    bytes: Option<Vec<u8>>,
}

impl ScriptedFetcher {
    pub fn none() -> Self {
        Self { bytes: None }
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes: Some(bytes) }
    }
}

#[async_trait]
impl ImageFetcher for ScriptedFetcher {
    async fn fetch(&self, _image_url: &str) -> Option<Vec<u8>> {
        self.bytes.clone()
    }
}

/// Service-port double backed by fixed task/item lists.
#[derive(Default)]
pub struct ScriptedPort {
    pub tasks: Vec<MonitoringTask>,
    pub items: Vec<Item>,
    pub last_got_item_calls: Mutex<Vec<String>>,
    pub last_updated_calls: Mutex<Vec<i64>>,
}

#[async_trait]
impl MonitoringPort for ScriptedPort {
    async fn pending_tasks(&self) -> Result<Vec<MonitoringTask>> {
        Ok(self.tasks.clone())
    }

    async fn items_to_send(&self, _task: &MonitoringTask) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }

    async fn update_last_got_item(&self, chat_id: &str) -> Result<()> {
        self.last_got_item_calls.lock().push(chat_id.to_string());
        Ok(())
    }

    async fn update_last_updated(&self, task: &MonitoringTask) -> Result<()> {
        self.last_updated_calls.lock().push(task.id);
        Ok(())
    }
}
