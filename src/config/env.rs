use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub admin_ids: Vec<i64>,
    pub check_frequency_seconds: u64,
    pub topn_db: TopnDbConfig,
    pub redis: RedisConfig,
    pub retention: RetentionConfig,
    pub logging: LoggingConfig,
    pub timezone: String,
}

#[derive(Debug, Clone)]
pub struct TopnDbConfig {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Upstream stores item data for this many days before sweeping it.
    pub remove_old_items_days: u64,
}

impl RetentionConfig {
    /// Cached Telegram file_ids must never outlive the item data they
    /// reference, so the TTL is always one day longer than the retention
    /// window rather than a free-standing setting.
    pub fn image_cache_ttl_days(&self) -> u64 {
        self.remove_old_items_days + 1
    }

    pub fn image_cache_ttl_seconds(&self) -> u64 {
        self.image_cache_ttl_days() * 86_400
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub logs_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}
