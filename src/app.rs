use std::{sync::Arc, time::Duration};

use anyhow::Result;
use reqwest::Client;
use teloxide::prelude::*;

use crate::{
    cache::RedisPhotoCache,
    config::AppConfig,
    infrastructure::shutdown::Shutdown,
    notifier::{HttpImageFetcher, ImageDelivery, Notifier},
    repository::{MonitoringRepository, TopnDbClient},
    telegram::{self, TelegramMessenger},
};

pub struct MonitorApp {
    notifier: Notifier,
    shutdown: Shutdown,
    config: Arc<AppConfig>,
    bot: Bot,
}

impl MonitorApp {
    pub async fn initialize(config: AppConfig, shutdown: Shutdown) -> Result<Self> {
        let config = Arc::new(config);

        let http_client = Client::builder()
            .user_agent(format!("olx-monitor-rust/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let topn_db = TopnDbClient::new(http_client.clone(), config.topn_db.clone());
        let repository = Arc::new(MonitoringRepository::new(topn_db, &config.timezone));

        let cache = Arc::new(RedisPhotoCache::connect(&config.redis).await?);
        let bot = Bot::new(&config.telegram_bot_token);
        let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
        let fetcher = Arc::new(HttpImageFetcher::new(http_client));

        let delivery = ImageDelivery::new(
            messenger.clone(),
            cache,
            fetcher,
            config.retention.image_cache_ttl_seconds(),
        );
        let notifier = Notifier::new(repository, messenger, delivery);

        Ok(Self {
            notifier,
            shutdown,
            config,
            bot,
        })
    }

    pub async fn run(self) -> Result<()> {
        let MonitorApp {
            notifier,
            shutdown,
            config,
            bot,
        } = self;

        tracing::info!("OLX monitoring notifier starting");
        telegram::notify_admins(&bot, config.as_ref(), "🤖 BOT WAS STARTED").await;

        let interval = Duration::from_secs(config.check_frequency_seconds);
        notifier.run(interval, shutdown.listener()).await;

        tracing::info!("shutdown complete");
        telegram::notify_admins(&bot, config.as_ref(), "🛑 BOT WAS STOPPED").await;
        Ok(())
    }
}
