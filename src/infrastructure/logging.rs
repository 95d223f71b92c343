use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Console plus daily-rolling file output. Safe to call more than once; only
/// the first call installs the subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let logs_dir = ensure_logs_dir(&config.logs_dir)?;

        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let file_appender = tracing_appender::rolling::daily(&logs_dir, "bot.log");
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        let console_layer = fmt::layer()
            .with_writer(io::stdout)
            .with_target(true)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        tracing::info!(logs = %logs_dir.display(), "tracing initialized");
        Ok(())
    })?;
    Ok(())
}

fn ensure_logs_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create logs directory {path}"))?;
    }
    Ok(dir.canonicalize().unwrap_or(dir))
}
