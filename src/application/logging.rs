//! # Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (`RUST_LOG` wins over the
//! configured filter), a console layer and a non-blocking file layer. The previous
//! session log is cleared on every start.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

/// Creates the log directory and removes the last session's file.
pub fn prepare_log_file(config: &LoggingConfig) -> Result<()> {
    let dir = Path::new(&config.directory);
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    let log_path = dir.join(&config.file);
    if log_path.exists() {
        fs::remove_file(&log_path)
            .with_context(|| format!("Failed to clear previous log {}", log_path.display()))?;
    }
    Ok(())
}

pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// The returned guard flushes the file writer and must live until shutdown.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    prepare_log_file(config)?;

    let file_appender = tracing_appender::rolling::never(&config.directory, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
