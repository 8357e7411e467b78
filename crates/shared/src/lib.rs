//! Shared library for the icon catalog scraper.
//!
//! This crate provides common functionality used by both binary crates:
//! - Configuration management
//! - Category and artifact data models
//! - JSON artifact persistence
//! - Logging infrastructure

pub mod artifacts;
pub mod config;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use artifacts::ArtifactWriter;
pub use config::{Config, ScraperConfig, SelectorConfig, Timings};
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
