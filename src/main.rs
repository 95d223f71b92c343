mod app;
mod cache;
mod config;
mod domain;
mod infrastructure;
mod notifier;
mod repository;
mod telegram;

use anyhow::Result;
use infrastructure::{logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    logging::init_tracing(&config.logging)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown.listen_for_signals();

    let app = app::MonitorApp::initialize(config, shutdown).await?;
    app.run().await
}
