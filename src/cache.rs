use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::config::RedisConfig;

/// Key-value store for Telegram photo file_ids, keyed by source image URL.
///
/// The delivery engine is the only writer; entries expire on their own after
/// the configured TTL and are deleted early when Telegram rejects a handle.
#[async_trait]
pub trait PhotoCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

pub fn photo_key(image_url: &str) -> String {
    format!("photo:{image_url}")
}

#[derive(Clone)]
pub struct RedisPhotoCache {
    manager: ConnectionManager,
}

impl RedisPhotoCache {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        tracing::info!(target: "cache", url = %config.url, "connecting to Redis");
        let client = Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl PhotoCache for RedisPhotoCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}
