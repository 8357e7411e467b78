//! Logging infrastructure for the icon catalog scraper.
//!
//! This module provides structured logging with daily file rotation,
//! contextual fields, and per-crate log levels.

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "icon-scraper".to_string(),
            default_level: Level::INFO,
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build a logging setup for `component` from the `[logging]` config section.
    ///
    /// `verbose` forces DEBUG regardless of the configured level. An
    /// unrecognised level name falls back to INFO.
    pub fn from_settings(
        settings: &LoggingConfig,
        log_dir: &Path,
        component: &str,
        verbose: bool,
    ) -> Self {
        let default_level = if verbose {
            Level::DEBUG
        } else {
            Level::from_str(&settings.default_level).unwrap_or(Level::INFO)
        };

        Self {
            log_dir: log_dir.to_string_lossy().to_string(),
            component: component.to_string(),
            default_level,
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set
    fn default_directives(&self) -> String {
        let level = self.default_level;
        format!(
            "{}={level},shared={level},icon_scraper={level},category_metadata={level},\
             fantoccini=warn,hyper=warn,hyper_util=warn",
            self.component.replace('-', "_"),
        )
    }
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Daily file rotation under `log_dir`, one file prefix per component
/// - Structured logging with contextual fields
/// - Crate-specific log levels, overridable via `RUST_LOG`
/// - Optional JSON formatting for the file layer
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    if config.file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let mut layers = Vec::new();

    // Console layer (human-readable)
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stdout)
            .boxed();
        layers.push(console_layer);
    }

    // File layer with rotation
    if config.file {
        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}
