use std::env;

use super::env::{
    AppConfig, ConfigError, LoggingConfig, RedisConfig, RetentionConfig, TopnDbConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let telegram_bot_token =
            env::var("TELEGRAM_BOT_TOKEN").map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admin_ids = env::var("ADMIN_IDS")
            .ok()
            .map(|value| {
                value
                    .split(',')
                    .filter_map(|part| part.trim().parse::<i64>().ok())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let check_frequency_seconds = parse_u64("CHECK_FREQUENCY_SECONDS").unwrap_or(10);

        let topn_db = TopnDbConfig {
            base_url: env::var("TOPN_DB_BASE_URL")
                .map_err(|_| ConfigError::Missing("TOPN_DB_BASE_URL"))?,
        };

        let redis = RedisConfig {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        };

        let retention = RetentionConfig {
            remove_old_items_days: parse_u64("DB_REMOVE_OLD_ITEMS_DATA_N_DAYS").unwrap_or(7),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let timezone = env::var("BOT_TIMEZONE").unwrap_or_else(|_| "Europe/Warsaw".to_string());

        Ok(Self {
            telegram_bot_token,
            admin_ids,
            check_frequency_seconds,
            topn_db,
            redis,
            retention,
            logging,
            timezone,
        })
    }
}

fn parse_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok())
}
