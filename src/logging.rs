// ABOUTME: Tracing subscriber setup: env filter, stdout text or JSON, optional daily log file
// ABOUTME: The returned guard must live until exit so buffered file logs are flushed

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// JSON lines on stdout instead of human-readable text
    pub json: bool,
    /// Also write a daily rolling file in this directory
    pub file_dir: Option<PathBuf>,
}

pub fn init(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = if options.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    let (file_layer, guard) = match &options.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(dir, "guanaco.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    if let Some(dir) = &options.file_dir {
        tracing::info!(dir = %dir.display(), "Writing logs to file");
    }

    Ok(guard)
}
