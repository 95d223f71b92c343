pub mod env;
mod loader;

pub use env::{AppConfig, LoggingConfig, RedisConfig, RetentionConfig, TopnDbConfig};
pub use loader::load_config;
