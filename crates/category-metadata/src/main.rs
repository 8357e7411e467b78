//! Regenerates the category summary from an existing category dump.
//!
//! No browser is involved; the summary is derived entirely from the dump.

use anyhow::{Context, Result};
use clap::Parser;
use shared::{ArtifactWriter, Config, LogConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        &config.log_dir(),
        "category-metadata",
        args.verbose,
    ))?;

    let writer = ArtifactWriter::from_config(&config);
    info!(
        input = %writer.categories_path().display(),
        output = %writer.metadata_path().display(),
        "Regenerating category summary"
    );

    let summary = writer
        .regenerate_summary()
        .context("Failed to regenerate category summary")?;

    info!("Total categories: {}", summary.category_names.len());
    info!("Total icons: {}", summary.metadata.total_icons);

    Ok(())
}
