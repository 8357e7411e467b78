//! Category discovery.
//!
//! Reads the category filter list from the loaded catalog page and turns each
//! filter input into a [`Category`] with a normalized name.

use shared::{Category, SelectorConfig, Timings};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::{Lookup, Node, Page};

/// Normalize a category label into a lowercase, hyphenated slug.
///
/// Whitespace runs and `+` become hyphens, anything outside `[a-z0-9-]` is
/// dropped, hyphen runs collapse and edge hyphens are trimmed.
pub fn clean_category_name(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for c in raw.to_lowercase().chars() {
        if is_separator_space(c) || c == '+' || c == '-' {
            pending_hyphen = true;
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        }
    }

    slug
}

/// Unicode whitespace plus the ASCII information separators `\x1c`..`\x1f`,
/// which regex `\s` also matches.
fn is_separator_space(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Finds the category filters on a catalog page
pub struct CategoryDiscoverer<'a, P: Page> {
    page: &'a P,
    selectors: &'a SelectorConfig,
    timings: &'a Timings,
}

impl<'a, P: Page> CategoryDiscoverer<'a, P> {
    pub fn new(page: &'a P, selectors: &'a SelectorConfig, timings: &'a Timings) -> Self {
        Self {
            page,
            selectors,
            timings,
        }
    }

    /// Discover all category filters in document order.
    ///
    /// `NotFound` means the category container is missing, which leaves
    /// nothing to scrape.
    pub async fn discover(&self) -> Lookup<Vec<Category>> {
        let container = match self.page.find(&self.selectors.category_container).await {
            Ok(Some(container)) => container,
            Ok(None) => {
                error!(
                    selector = %self.selectors.category_container,
                    "Could not find category container"
                );
                return Lookup::NotFound;
            }
            Err(e) => {
                error!(
                    selector = %self.selectors.category_container,
                    error = %e,
                    "Failed to query category container"
                );
                return Lookup::NotFound;
            }
        };

        self.render_lazy_entries(&container).await;

        let inputs = match container.find_all(&self.selectors.category_input).await {
            Ok(inputs) => inputs,
            Err(e) => {
                error!(error = %e, "Failed to list category inputs");
                return Lookup::Found(Vec::new());
            }
        };
        info!(inputs = inputs.len(), "Category inputs found");

        let mut categories = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let id = match input.attr("id").await {
                Ok(Some(id)) => id,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to read category input id");
                    continue;
                }
            };

            if let Some(category) = self.category_from_id(id) {
                categories.push(category);
            }
        }

        Lookup::Found(categories)
    }

    fn category_from_id(&self, id: String) -> Option<Category> {
        let label = id.strip_prefix(self.selectors.category_id_prefix.as_str())?;
        let name = clean_category_name(label);

        if name.is_empty() {
            warn!(input_id = %id, "Category name is empty after cleaning, skipping");
            return None;
        }

        Some(Category { id, name })
    }

    /// Bring the container and each list entry into view so lazily rendered
    /// entries exist before the inputs are read. Failures are logged only.
    async fn render_lazy_entries(&self, container: &P::Node) {
        info!("Scrolling through category list to load all categories");

        if let Err(e) = container.scroll_into_view().await {
            warn!(error = %e, "Failed to scroll category container into view");
        }
        sleep(self.timings.scroll_settle()).await;

        let entries = match container.find_all(&self.selectors.category_entry).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to list category entries");
                return;
            }
        };

        for (idx, entry) in entries.iter().enumerate() {
            if let Err(e) = entry.scroll_into_view().await {
                debug!(entry = idx, error = %e, "Failed to scroll category entry");
                continue;
            }
            if idx % 5 == 0 {
                sleep(self.timings.scroll_settle() / 2).await;
            }
        }

        if let Some(last) = entries.last() {
            if let Err(e) = last.scroll_into_view().await {
                debug!(error = %e, "Failed to scroll last category entry");
            }
            sleep(self.timings.grid_settle()).await;
        }
    }
}
