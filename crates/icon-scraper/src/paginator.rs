//! Result page traversal for one applied category filter.
//!
//! [`Paginator::pages`] yields one [`PageBatch`] per result page and stops
//! when the next-page control is missing, disabled or unclickable, or when
//! the page cap is reached. [`Paginator::collect_icons`] folds the batches
//! into one deduplicated list.

use futures::stream::{self, Stream, StreamExt};
use shared::{SelectorConfig, Timings};
use std::collections::HashSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{Locator, Lookup, Node, Page};

/// Icons found on one result page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBatch {
    /// 1-based page number
    pub page: usize,
    pub icons: Vec<String>,
    /// The walk stopped here at the page cap although an enabled next
    /// control was still present
    pub truncated: bool,
}

/// Everything one category's pages produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedIcons {
    /// Unique icons in first-seen order
    pub icons: Vec<String>,
    pub pages: usize,
    pub truncated: bool,
}

/// Drop repeated identifiers, keeping the first occurrence of each
pub fn dedup_preserving_order<I>(icons: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    icons
        .into_iter()
        .filter(|icon| seen.insert(icon.clone()))
        .collect()
}

/// Wait for the icon grid to be visible, then let it settle.
///
/// A timeout is only a warning; the caller reads whatever is rendered.
pub async fn wait_for_grid<P: Page>(page: &P, selectors: &SelectorConfig, timings: &Timings) {
    match page
        .wait_for_visible(&selectors.icon_article, timings.element_wait_timeout())
        .await
    {
        Ok(Lookup::Found(_)) => sleep(timings.grid_settle()).await,
        Ok(Lookup::TimedOut) | Ok(Lookup::NotFound) => {
            warn!(
                timeout_ms = timings.element_wait_timeout,
                "Timeout waiting for grid to update"
            );
        }
        Err(e) => warn!(error = %e, "Failed while waiting for grid"),
    }
}

/// Walks the result pages of the currently applied filter
pub struct Paginator<'a, P: Page> {
    page: &'a P,
    selectors: &'a SelectorConfig,
    timings: &'a Timings,
    max_pages: usize,
}

impl<P: Page> Clone for Paginator<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Page> Copy for Paginator<'_, P> {}

impl<'a, P: Page> Paginator<'a, P> {
    pub fn new(
        page: &'a P,
        selectors: &'a SelectorConfig,
        timings: &'a Timings,
        max_pages: usize,
    ) -> Self {
        Self {
            page,
            selectors,
            timings,
            max_pages,
        }
    }

    /// Lazily scrape page after page.
    ///
    /// Each poll of the stream scrapes the current page and then tries to
    /// advance, so dropping the stream early leaves the browser on the last
    /// page yielded (or the one after it).
    pub fn pages(&self) -> impl Stream<Item = PageBatch> + 'a {
        let this = *self;
        stream::unfold(Some(1usize), move |cursor| async move {
            let page_num = cursor?;

            wait_for_grid(this.page, this.selectors, this.timings).await;
            let icons = this.extract_icons().await;
            debug!(page = page_num, icons = icons.len(), "Scraped result page");

            let mut truncated = false;
            let next = match this.enabled_next_control(page_num).await {
                None => None,
                Some(_) if page_num >= this.max_pages => {
                    warn!(max_pages = this.max_pages, "Reached page limit for category");
                    truncated = true;
                    None
                }
                Some(control) => this
                    .click_next(&control, page_num)
                    .await
                    .then_some(page_num + 1),
            };

            let batch = PageBatch {
                page: page_num,
                icons,
                truncated,
            };
            Some((batch, next))
        })
    }

    /// Scrape every page and return the category's unique icons in the order
    /// they first appeared.
    pub async fn collect_icons(&self, category_name: &str) -> CollectedIcons {
        info!(category = %category_name, "Scraping category");

        let batches: Vec<PageBatch> = self
            .pages()
            .inspect(|batch| {
                info!(page = batch.page, found = batch.icons.len(), "Found icons on page")
            })
            .collect()
            .await;

        let pages = batches.len();
        let truncated = batches.last().is_some_and(|b| b.truncated);
        let icons = dedup_preserving_order(batches.into_iter().flat_map(|b| b.icons));

        info!(
            category = %category_name,
            pages,
            unique_icons = icons.len(),
            "Category scrape complete"
        );
        CollectedIcons {
            icons,
            pages,
            truncated,
        }
    }

    /// Class strings of every icon glyph in the grid. An article whose glyph
    /// cannot be read is skipped.
    async fn extract_icons(&self) -> Vec<String> {
        let articles = match self.page.find_all(&self.selectors.icon_article).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "Failed to list icons on page");
                return Vec::new();
            }
        };

        let mut icons = Vec::with_capacity(articles.len());
        for article in &articles {
            let glyph = match article.find(&self.selectors.icon_glyph).await {
                Ok(Some(glyph)) => glyph,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to extract icon from article");
                    continue;
                }
            };

            match glyph.attr("class").await {
                Ok(Some(class)) if !class.trim().is_empty() => icons.push(class.trim().to_string()),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to extract icon from article"),
            }
        }
        icons
    }

    /// The next page control if there is one and it is enabled. `None`
    /// means this is the last page.
    async fn enabled_next_control(&self, page_num: usize) -> Option<P::Node> {
        let Some(next) = self.find_next_control(page_num).await else {
            debug!(page = page_num, "No next page control, last page");
            return None;
        };

        if is_disabled(&next).await {
            debug!(page = page_num, "Next page control disabled, last page");
            return None;
        }
        Some(next)
    }

    /// Click through to the next page. `false` if the click failed.
    async fn click_next(&self, next: &P::Node, page_num: usize) -> bool {
        if let Err(e) = next.click().await {
            warn!(page = page_num, error = %e, "Could not click next page control");
            return false;
        }
        sleep(self.timings.delay_between_pages()).await;
        true
    }

    /// The aria-labelled next control, or failing that a pagination link
    /// reading the next page number or "next".
    async fn find_next_control(&self, page_num: usize) -> Option<P::Node> {
        if let Lookup::Found(next) = Locator::new(self.page, &self.selectors.next_page)
            .resolve()
            .await
        {
            return Some(next);
        }

        let links = match self.page.find_all(&self.selectors.pagination_links).await {
            Ok(links) => links,
            Err(e) => {
                warn!(error = %e, "Error checking for next page");
                return None;
            }
        };

        let wanted = (page_num + 1).to_string();
        for link in links {
            let text = match link.text().await {
                Ok(text) => text.trim().to_lowercase(),
                Err(e) => {
                    debug!(error = %e, "Failed to read pagination link text");
                    continue;
                }
            };
            if text == wanted || text.contains("next") {
                return Some(link);
            }
        }
        None
    }
}

/// A control counts as disabled if it carries a `disabled` attribute,
/// `aria-disabled="true"`, or a `disabled` class. Unreadable attributes count
/// as disabled so a broken control ends pagination.
async fn is_disabled<N: Node>(control: &N) -> bool {
    let disabled = control.attr("disabled").await;
    let aria_disabled = control.attr("aria-disabled").await;
    let class = control.attr("class").await;

    match (disabled, aria_disabled, class) {
        (Ok(disabled), Ok(aria_disabled), Ok(class)) => {
            disabled.is_some()
                || aria_disabled.as_deref() == Some("true")
                || class.unwrap_or_default().contains("disabled")
        }
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
            warn!(error = %e, "Could not read next page control state");
            true
        }
    }
}
