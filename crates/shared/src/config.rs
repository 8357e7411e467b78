//! Configuration management for the icon catalog scraper.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. Every section falls back to its
//! defaults, so a partial file only needs the values it overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output artifact settings
    pub output: OutputConfig,

    /// Browser and pacing settings
    pub scraper: ScraperConfig,

    /// CSS contract of the catalog site
    pub selectors: SelectorConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

/// Output artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Full dump (metadata plus every category's icons)
    pub categories_file: String,

    /// Summary (metadata, sorted names, per-category counts)
    pub metadata_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            categories_file: "fontawesome_icon_categories.json".to_string(),
            metadata_file: "fontawesome_categories_metadata.json".to_string(),
        }
    }
}

/// Browser session and scraping behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Catalog page listing the free classic collection
    pub base_url: String,

    /// WebDriver endpoint (chromedriver listens on 9515 by default)
    pub webdriver_url: String,

    /// Run Chrome without a visible window
    pub headless: bool,

    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,

    /// Upper bound on result pages walked for one category
    pub max_pages_per_category: usize,

    /// Waits and pauses
    pub timings: Timings,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fontawesome.com/search?ip=classic&ic=free-collection".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            max_pages_per_category: 200,
            timings: Timings::default(),
        }
    }
}

/// Waits and pacing delays, all in milliseconds.
///
/// Timeouts bound a wait; a timeout is reported as a warning and the scrape
/// continues with whatever the page currently shows. Delays are fixed pauses
/// that give the page time to re-render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub page_load_timeout: u64,
    pub element_wait_timeout: u64,
    /// Pause after the initial navigation for dynamic content
    pub initial_settle: u64,
    /// Pause after the grid becomes visible
    pub grid_settle: u64,
    pub scroll_settle: u64,
    pub click_settle: u64,
    pub delay_between_pages: u64,
    pub delay_between_categories: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_load_timeout: 30_000,
            element_wait_timeout: 10_000,
            initial_settle: 2_000,
            grid_settle: 500,
            scroll_settle: 200,
            click_settle: 300,
            delay_between_pages: 500,
            delay_between_categories: 1_000,
        }
    }
}

impl Timings {
    /// No pauses and short waits, for driving a simulated page.
    pub fn immediate() -> Self {
        Self {
            page_load_timeout: 1_000,
            element_wait_timeout: 50,
            initial_settle: 0,
            grid_settle: 0,
            scroll_settle: 0,
            click_settle: 0,
            delay_between_pages: 0,
            delay_between_categories: 0,
        }
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout)
    }

    pub fn element_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.element_wait_timeout)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle)
    }

    pub fn grid_settle(&self) -> Duration {
        Duration::from_millis(self.grid_settle)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle)
    }

    pub fn delay_between_pages(&self) -> Duration {
        Duration::from_millis(self.delay_between_pages)
    }

    pub fn delay_between_categories(&self) -> Duration {
        Duration::from_millis(self.delay_between_categories)
    }
}

/// CSS selectors describing the catalog's markup.
///
/// These track one specific site and drift when it is redesigned. Templates
/// containing `{id}` are filled with a category's input id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub category_container: String,
    pub category_entry: String,
    pub category_input: String,
    pub category_id_prefix: String,
    pub category_label: String,
    pub category_input_by_id: String,
    pub icon_article: String,
    pub icon_glyph: String,
    /// Tried in order; the first match is the next-page control
    pub next_page: Vec<String>,
    /// Scanned by text when no next-page selector matches
    pub pagination_links: String,
    pub clear_filters: Vec<String>,
    /// Scanned for a "clear" caption when no clear-filter selector matches
    pub clear_filters_text_scan: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            category_container: ".icons-facets-group-categories".to_string(),
            category_entry: "li".to_string(),
            category_input: "input[id^='icons-category-']".to_string(),
            category_id_prefix: "icons-category-".to_string(),
            category_label: "label[for='{id}']".to_string(),
            category_input_by_id: "input[id='{id}']".to_string(),
            icon_article: "article.wrap-icon".to_string(),
            icon_glyph: "button.icon.flat i".to_string(),
            next_page: vec![
                ".pagination-large-screen a[aria-label*='next']".to_string(),
                ".pagination-large-screen a[aria-label*='Next']".to_string(),
                ".pagination-large-screen button[aria-label*='next']".to_string(),
                ".pagination-large-screen button[aria-label*='Next']".to_string(),
            ],
            pagination_links: ".pagination-large-screen a, .pagination-large-screen button"
                .to_string(),
            clear_filters: vec![
                "button[aria-label*='clear']".to_string(),
                "button[aria-label*='Clear']".to_string(),
                ".filter-reset".to_string(),
                "[data-clear-filters]".to_string(),
            ],
            clear_filters_text_scan: "button".to_string(),
        }
    }
}

impl SelectorConfig {
    /// Selector for the label toggling the given category input
    pub fn label_for(&self, input_id: &str) -> String {
        self.category_label.replace("{id}", input_id)
    }

    /// Selector for the category input itself
    pub fn input_with_id(&self, input_id: &str) -> String {
        self.category_input_by_id.replace("{id}", input_id)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path of the full category dump
    pub fn categories_path(&self) -> PathBuf {
        self.resolve(&self.output.categories_file)
    }

    /// Get the path of the category summary
    pub fn metadata_path(&self) -> PathBuf {
        self.resolve(&self.output.metadata_file)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
