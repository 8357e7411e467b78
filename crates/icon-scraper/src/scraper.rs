//! Main scraper orchestrator.
//!
//! Loads the catalog, discovers categories, then cycles through them one at
//! a time: apply the filter, scrape every result page, reset the filter.
//! Results accumulate in a [`CategoryIconMap`] owned by the scraper so they
//! survive an aborted or interrupted run.

use anyhow::{bail, Result};
use shared::{Category, CategoryIconMap, ScraperConfig, SelectorConfig};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserError, Locator, Lookup, Node, Page};
use crate::discovery::CategoryDiscoverer;
use crate::paginator::{wait_for_grid, Paginator};

/// Statistics for a scraping session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub categories_discovered: usize,
    pub categories_recorded: usize,
    /// Filter could not be applied
    pub categories_skipped: usize,
    /// Filter applied but no icons found
    pub categories_empty: usize,
    /// Icons found under a name that was already recorded
    pub categories_duplicate: usize,
    pub reset_failures: usize,
    /// Result pages read across all applied filters
    pub pages_visited: usize,
    pub icons_recorded: usize,
}

/// Where a category is in its apply/scrape/reset cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    FilterApplied,
    Scraped,
    FilterReset,
}

impl CyclePhase {
    /// Legal moves of the per-category cycle. `Scraped -> Idle` is the path
    /// taken when the filter could not be reset.
    pub fn can_move_to(self, next: CyclePhase) -> bool {
        matches!(
            (self, next),
            (CyclePhase::Idle, CyclePhase::FilterApplied)
                | (CyclePhase::FilterApplied, CyclePhase::Scraped)
                | (CyclePhase::Scraped, CyclePhase::FilterReset)
                | (CyclePhase::Scraped, CyclePhase::Idle)
                | (CyclePhase::FilterReset, CyclePhase::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::FilterApplied => "filter_applied",
            CyclePhase::Scraped => "scraped",
            CyclePhase::FilterReset => "filter_reset",
        }
    }
}

/// What happened to one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// Icons recorded under the category name
    Recorded(usize),
    /// Scraped, but the grid never showed an icon
    Empty,
    /// Scraped, but the name was already recorded by an earlier category
    Duplicate,
    /// The filter could not be applied
    Skipped,
}

/// Main scraper coordinator
pub struct IconScraper {
    config: ScraperConfig,
    selectors: SelectorConfig,
    results: CategoryIconMap,
    stats: ScrapeStats,
    phase: CyclePhase,
}

impl IconScraper {
    /// Create a new scraper
    pub fn new(config: ScraperConfig, selectors: SelectorConfig) -> Self {
        Self {
            config,
            selectors,
            results: CategoryIconMap::new(),
            stats: ScrapeStats::default(),
            phase: CyclePhase::Idle,
        }
    }

    /// Icons recorded so far
    pub fn results(&self) -> &CategoryIconMap {
        &self.results
    }

    pub fn into_results(self) -> CategoryIconMap {
        self.results
    }

    pub fn stats(&self) -> &ScrapeStats {
        &self.stats
    }

    /// Where the current category is in its cycle; `Idle` between categories
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Run the complete scraping process
    ///
    /// 1. Load the catalog page
    /// 2. Discover categories (fatal if none)
    /// 3. Cycle through every category
    pub async fn run<P: Page>(&mut self, page: &P) -> Result<ScrapeStats> {
        let timings = &self.config.timings;

        info!(url = %self.config.base_url, "Navigating to catalog");
        match page.goto(&self.config.base_url).await {
            Ok(()) => {}
            Err(BrowserError::NavigationTimeout { timeout_ms, .. }) => {
                warn!(timeout_ms, "Page load timed out, continuing with what has rendered");
            }
            Err(e) => return Err(e.into()),
        }
        info!("Page loaded, waiting for content");
        sleep(timings.initial_settle()).await;

        info!("Finding categories");
        let categories = CategoryDiscoverer::new(page, &self.selectors, timings)
            .discover()
            .await
            .found()
            .unwrap_or_default();

        if categories.is_empty() {
            bail!(
                "No categories found, check the category selector ({})",
                self.selectors.category_container
            );
        }

        self.stats.categories_discovered = categories.len();
        info!(categories = categories.len(), "Discovered categories");

        self.scrape_categories(page, &categories).await;

        info!(
            discovered = self.stats.categories_discovered,
            recorded = self.stats.categories_recorded,
            skipped = self.stats.categories_skipped,
            empty = self.stats.categories_empty,
            duplicate = self.stats.categories_duplicate,
            reset_failures = self.stats.reset_failures,
            pages = self.stats.pages_visited,
            icons = self.stats.icons_recorded,
            "Category scrape complete"
        );

        Ok(self.stats.clone())
    }

    /// Process `categories` in order with the configured pause between them
    pub async fn scrape_categories<P: Page>(&mut self, page: &P, categories: &[Category]) {
        for (idx, category) in categories.iter().enumerate() {
            info!(
                progress = %format!("{}/{}", idx + 1, categories.len()),
                category = %category.name,
                "Processing category"
            );

            match self.process_category(page, category).await {
                CategoryOutcome::Recorded(count) => {
                    self.stats.categories_recorded += 1;
                    self.stats.icons_recorded += count;
                }
                CategoryOutcome::Empty => self.stats.categories_empty += 1,
                CategoryOutcome::Duplicate => self.stats.categories_duplicate += 1,
                CategoryOutcome::Skipped => self.stats.categories_skipped += 1,
            }

            if idx + 1 < categories.len() {
                sleep(self.config.timings.delay_between_categories()).await;
            }
        }
    }

    /// Apply, scrape and reset one category
    pub async fn process_category<P: Page>(
        &mut self,
        page: &P,
        category: &Category,
    ) -> CategoryOutcome {
        let timings = self.config.timings.clone();

        if !self.apply_filter(page, category).await {
            warn!(category = %category.name, "Skipping category due to click failure");
            return CategoryOutcome::Skipped;
        }
        self.transition(category, CyclePhase::FilterApplied);

        wait_for_grid(page, &self.selectors, &timings).await;
        let max_pages = self.config.max_pages_per_category;
        let collected = Paginator::new(page, &self.selectors, &timings, max_pages)
            .collect_icons(&category.name)
            .await;
        self.stats.pages_visited += collected.pages;
        if collected.truncated {
            warn!(
                category = %category.name,
                pages = collected.pages,
                "Category has more pages than the page limit"
            );
        }
        self.transition(category, CyclePhase::Scraped);

        let outcome = if collected.icons.is_empty() {
            warn!(category = %category.name, "No icons found for category");
            CategoryOutcome::Empty
        } else {
            let count = collected.icons.len();
            if self.results.insert(category.name.clone(), collected.icons) {
                CategoryOutcome::Recorded(count)
            } else {
                warn!(
                    category = %category.name,
                    input_id = %category.id,
                    "Category name already recorded, keeping the first scrape"
                );
                CategoryOutcome::Duplicate
            }
        };

        if self.reset_filter(page, category).await {
            self.transition(category, CyclePhase::FilterReset);
        } else {
            self.stats.reset_failures += 1;
            warn!(category = %category.name, "Could not reset category filter");
        }
        self.transition(category, CyclePhase::Idle);

        outcome
    }

    fn transition(&mut self, category: &Category, next: CyclePhase) {
        if !self.phase.can_move_to(next) {
            warn!(
                category = %category.name,
                from = self.phase.as_str(),
                to = next.as_str(),
                "Unexpected category phase change"
            );
        }
        debug!(
            category = %category.name,
            from = self.phase.as_str(),
            to = next.as_str(),
            "Category phase change"
        );
        self.phase = next;
    }

    /// The category's label, falling back to its input, re-found under the
    /// category container on every call.
    fn category_control<'p, P: Page>(&self, page: &'p P, category: &Category) -> Locator<'p, P> {
        Locator::new(
            page,
            [
                self.selectors.label_for(&category.id),
                self.selectors.input_with_id(&category.id),
            ],
        )
        .within(self.selectors.category_container.clone())
    }

    /// Click the category's control to filter the grid
    async fn apply_filter<P: Page>(&self, page: &P, category: &Category) -> bool {
        let control = match self.category_control(page, category).resolve().await {
            Lookup::Found(control) => control,
            Lookup::NotFound | Lookup::TimedOut => {
                error!(
                    category = %category.name,
                    input_id = %category.id,
                    "Could not find element for category"
                );
                return false;
            }
        };

        match self.click_control(&control).await {
            Ok(()) => {
                info!(category = %category.name, "Clicked category");
                true
            }
            Err(e) => {
                error!(category = %category.name, error = %e, "Error clicking category");
                false
            }
        }
    }

    /// Click the category's control again to clear the filter, falling back
    /// to the page's clear-filters control.
    async fn reset_filter<P: Page>(&self, page: &P, category: &Category) -> bool {
        let control = match self.category_control(page, category).resolve().await {
            Lookup::Found(control) => control,
            Lookup::NotFound | Lookup::TimedOut => {
                debug!(category = %category.name, "Category control gone, trying clear filters");
                return self.clear_filters(page).await;
            }
        };

        match self.click_control(&control).await {
            Ok(()) => {
                wait_for_grid(page, &self.selectors, &self.config.timings).await;
                true
            }
            Err(e) => {
                warn!(category = %category.name, error = %e, "Error unclicking category");
                self.clear_filters(page).await
            }
        }
    }

    /// Click a clear/reset filters control if the page has one
    async fn clear_filters<P: Page>(&self, page: &P) -> bool {
        let button = match Locator::new(page, &self.selectors.clear_filters).resolve().await {
            Lookup::Found(button) => Some(button),
            Lookup::NotFound | Lookup::TimedOut => self.find_clear_by_text(page).await,
        };

        let Some(button) = button else {
            warn!("No clear filters control found");
            return false;
        };

        match button.click().await {
            Ok(()) => {
                info!("Cleared filters");
                wait_for_grid(page, &self.selectors, &self.config.timings).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "Error clicking clear filters");
                false
            }
        }
    }

    async fn find_clear_by_text<P: Page>(&self, page: &P) -> Option<P::Node> {
        let buttons = match page.find_all(&self.selectors.clear_filters_text_scan).await {
            Ok(buttons) => buttons,
            Err(e) => {
                warn!(error = %e, "Failed to scan for clear filters control");
                return None;
            }
        };

        for button in buttons {
            match button.text().await {
                Ok(text) if text.to_lowercase().contains("clear") => return Some(button),
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Failed to read button text"),
            }
        }
        None
    }

    async fn click_control<N: Node>(&self, control: &N) -> Result<(), BrowserError> {
        let timings = &self.config.timings;
        control.scroll_into_view().await?;
        sleep(timings.scroll_settle()).await;
        control.click().await?;
        sleep(timings.click_settle()).await;
        Ok(())
    }
}
