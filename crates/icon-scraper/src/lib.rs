//! Icon scraper library for enumerating catalog icons by category.
//!
//! This library drives a browser through the catalog's category filters and
//! collects the icon class names shown for each one.

pub mod browser;
pub mod discovery;
pub mod paginator;
pub mod scraper;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserError, Locator, Lookup, Node, Page, WebDriverPage};
pub use discovery::{clean_category_name, CategoryDiscoverer};
pub use paginator::{dedup_preserving_order, CollectedIcons, PageBatch, Paginator};
pub use scraper::{CategoryOutcome, CyclePhase, IconScraper, ScrapeStats};
