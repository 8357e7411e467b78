//! JSON artifact persistence.
//!
//! Writes the full category dump and the derived summary as indented JSON,
//! and regenerates the summary from an existing dump without scraping.
//! Writes overwrite the whole file in place.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::models::{CategoryDump, CategoryIconMap, CategorySummary, ScrapeMetadata};

/// Writer for the two output artifacts
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    categories_path: PathBuf,
    metadata_path: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer for explicit artifact paths
    pub fn new(categories_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            categories_path: categories_path.into(),
            metadata_path: metadata_path.into(),
        }
    }

    /// Create a writer using the paths from the `[output]` section
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.categories_path(), config.metadata_path())
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Stamp `map` with the current time and write both artifacts
    pub fn save(&self, map: &CategoryIconMap) -> Result<ScrapeMetadata> {
        let metadata = ScrapeMetadata::now(map);

        let dump = CategoryDump {
            metadata: metadata.clone(),
            categories: map.clone(),
        };
        write_json(&self.categories_path, &dump)?;

        info!(
            path = %self.categories_path.display(),
            categories = metadata.total_categories,
            total_icons = metadata.total_icons,
            "Results saved"
        );

        self.write_summary(map, metadata.clone())?;
        Ok(metadata)
    }

    /// Derive the summary for `map` and write it
    pub fn write_summary(
        &self,
        map: &CategoryIconMap,
        metadata: ScrapeMetadata,
    ) -> Result<CategorySummary> {
        let summary = CategorySummary::derive(map, metadata);
        write_json(&self.metadata_path, &summary)?;

        info!(
            path = %self.metadata_path.display(),
            category_names = summary.category_names.len(),
            "Categories metadata saved"
        );

        Ok(summary)
    }

    /// Rebuild the summary from the dump on disk.
    ///
    /// The dump's scrape date is kept; totals are recomputed from its
    /// categories so the summary always agrees with its own counts.
    pub fn regenerate_summary(&self) -> Result<CategorySummary> {
        let dump = load_dump(&self.categories_path)?;
        let metadata = ScrapeMetadata::for_map(&dump.categories, dump.metadata.scrape_date);

        if metadata != dump.metadata {
            tracing::warn!(
                recorded_categories = dump.metadata.total_categories,
                recorded_icons = dump.metadata.total_icons,
                actual_categories = metadata.total_categories,
                actual_icons = metadata.total_icons,
                "Dump metadata disagrees with its categories, using recomputed totals"
            );
        }

        self.write_summary(&dump.categories, metadata)
    }
}

/// Read a full category dump
pub fn load_dump(path: impl AsRef<Path>) -> Result<CategoryDump> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read category dump: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse category dump: {}", path.display()))
}

/// Serialize `value` as two-space indented JSON, replacing `path`
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))
}
