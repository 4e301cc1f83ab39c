//! Logging system configuration and initialization
//!
//! - Console output, plain or JSON
//! - Optional daily-rolling log file
//! - `RUST_LOG` overrides the configured level
//! - Local-time timestamps

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "grocery-price-scraper.log";

/// Keeps the file writer flushing for the lifetime of the process
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Directory for log files when the config does not name one
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("grocery-price-scraper")
        .join("logs")
}

/// Filter for `config`, unless `RUST_LOG` is set
///
/// HTTP stack internals stay at warn/info unless trace is requested.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    if !config.level.to_lowercase().contains("trace") {
        for directive in ["reqwest=info", "hyper=warn", "hyper_util=warn", "h2=warn"] {
            filter = filter.add_directive(directive.parse()?);
        }
    }
    for (module, level) in &config.module_filters {
        filter = filter.add_directive(
            format!("{module}={level}")
                .parse()
                .with_context(|| format!("Invalid filter for module '{module}'"))?,
        );
    }
    Ok(filter)
}

/// Install the global subscriber
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(LocalTimeFormatter)
            .with_target(false);
        layers.push(if config.json_format {
            console.json().boxed()
        } else {
            console.boxed()
        });
    }

    let log_dir = config.directory.clone().unwrap_or_else(default_log_directory);
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        let (writer, guard) = non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
        // A second init keeps the first guard; the subscriber install below fails anyway.
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTimeFormatter)
                .with_ansi(false)
                .with_target(true)
                .boxed(),
        );
    }

    Registry::default()
        .with(layers)
        .with(build_env_filter(config)?)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Logging initialized (level: {})", config.level);
    if config.file_output {
        info!("Log directory: {}", log_dir.display());
    }
    Ok(())
}
