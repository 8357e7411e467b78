//! Icon scraper CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use icon_scraper::{IconScraper, WebDriverPage};
use shared::{ArtifactWriter, Config, LogConfig};
use std::path::PathBuf;
use tracing::{error, info, warn};

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

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        &config.log_dir(),
        "icon-scraper",
        args.verbose,
    ))?;

    info!("Icon scraper starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    let page = WebDriverPage::connect(&config.scraper)
        .await
        .context("Failed to start browser session")?;

    let mut scraper = IconScraper::new(config.scraper.clone(), config.selectors.clone());

    // Ctrl-C drops the run future; whatever was recorded before it is kept
    tokio::select! {
        outcome = scraper.run(&page) => match outcome {
            Ok(stats) => info!(
                recorded = stats.categories_recorded,
                skipped = stats.categories_skipped,
                empty = stats.categories_empty,
                duplicate = stats.categories_duplicate,
                pages = stats.pages_visited,
                "Scraping finished"
            ),
            Err(e) => error!(error = %format!("{:#}", e), "Fatal error during scraping"),
        },
        _ = tokio::signal::ctrl_c() => warn!("Scraping interrupted by user"),
    }

    if let Err(e) = page.close().await {
        warn!(error = %e, "Failed to close browser session");
    }

    let results = scraper.into_results();
    if results.is_empty() {
        error!("No data collected, check the selectors and page structure");
        return Ok(());
    }

    let writer = ArtifactWriter::from_config(&config);
    let metadata = writer.save(&results).context("Failed to save results")?;

    info!("=== Scraping Complete ===");
    info!("Categories: {}", metadata.total_categories);
    info!("Total icons: {}", metadata.total_icons);
    info!("Full dump: {}", writer.categories_path().display());
    info!("Summary: {}", writer.metadata_path().display());

    Ok(())
}
