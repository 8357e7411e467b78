//! Simulated catalog page for driving the scraper without a browser.
//!
//! Models the parts of the site the scraper touches: the category list with
//! toggling labels, a paged icon grid per category, the pagination bar and a
//! clear-filters button. Elements are matched by the default selectors.

use async_trait::async_trait;
use shared::SelectorConfig;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::browser::{BrowserError, Lookup, Node, Page, Result};

/// Icon class whose glyph cannot be read
pub const BROKEN_ICON: &str = "!broken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Entry(usize),
    Input(usize),
    Label(usize),
    Article(String),
    Glyph(String),
    Next,
    PageLink(usize),
    ClearButton,
}

#[derive(Debug, Clone)]
pub struct MockNode {
    site: Arc<Mutex<SiteState>>,
    kind: NodeKind,
}

impl MockNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

#[derive(Debug)]
struct MockCategory {
    id: String,
    pages: Vec<Vec<String>>,
    locatable: bool,
    resettable: bool,
}

#[derive(Debug)]
struct SiteState {
    selectors: SelectorConfig,
    categories: Vec<MockCategory>,
    container: bool,
    clear_button: bool,
    next_always_disabled: bool,
    page_links_only: bool,
    flaky_entry: Option<usize>,
    active: Option<usize>,
    page: usize,
    clicks: Vec<String>,
    visited: Vec<String>,
}

impl SiteState {
    fn active_pages(&self) -> Option<&[Vec<String>]> {
        self.active.map(|idx| self.categories[idx].pages.as_slice())
    }

    fn on_last_page(&self) -> bool {
        match self.active_pages() {
            Some(pages) => self.next_always_disabled || self.page + 1 >= pages.len(),
            None => true,
        }
    }

    fn grid(&self) -> Vec<String> {
        match self.active_pages() {
            Some(pages) => pages.get(self.page).cloned().unwrap_or_default(),
            None => self
                .categories
                .iter()
                .filter_map(|c| c.pages.first())
                .flatten()
                .cloned()
                .collect(),
        }
    }

    fn control_visible(&self, idx: usize) -> bool {
        let category = &self.categories[idx];
        category.locatable && (category.resettable || self.active != Some(idx))
    }
}

pub struct MockSiteBuilder {
    state: SiteState,
}

impl MockSiteBuilder {
    /// Add a category labelled `label` whose grid shows `pages`
    pub fn category(mut self, label: &str, pages: &[&[&str]]) -> Self {
        self.state.categories.push(MockCategory {
            id: format!("{}{}", self.state.selectors.category_id_prefix, label),
            pages: pages
                .iter()
                .map(|page| page.iter().map(|icon| icon.to_string()).collect())
                .collect(),
            locatable: true,
            resettable: true,
        });
        self
    }

    /// Listed during discovery, but its controls can never be found again
    pub fn unlocatable_category(mut self, label: &str, pages: &[&[&str]]) -> Self {
        self = self.category(label, pages);
        if let Some(last) = self.state.categories.last_mut() {
            last.locatable = false;
        }
        self
    }

    /// Its controls disappear once the filter is applied
    pub fn unresettable_category(mut self, label: &str, pages: &[&[&str]]) -> Self {
        self = self.category(label, pages);
        if let Some(last) = self.state.categories.last_mut() {
            last.resettable = false;
        }
        self
    }

    pub fn without_container(mut self) -> Self {
        self.state.container = false;
        self
    }

    pub fn without_clear_button(mut self) -> Self {
        self.state.clear_button = false;
        self
    }

    pub fn next_always_disabled(mut self) -> Self {
        self.state.next_always_disabled = true;
        self
    }

    /// No aria-labelled next control; only numbered page links
    pub fn page_links_only(mut self) -> Self {
        self.state.page_links_only = true;
        self
    }

    /// Scrolling the list entry at `idx` fails
    pub fn flaky_entry(mut self, idx: usize) -> Self {
        self.state.flaky_entry = Some(idx);
        self
    }

    pub fn build(self) -> MockSite {
        MockSite {
            state: Arc::new(Mutex::new(self.state)),
        }
    }
}

/// A scripted stand-in for the catalog page
pub struct MockSite {
    state: Arc<Mutex<SiteState>>,
}

impl MockSite {
    pub fn builder() -> MockSiteBuilder {
        MockSiteBuilder {
            state: SiteState {
                selectors: SelectorConfig::default(),
                categories: Vec::new(),
                container: true,
                clear_button: true,
                next_always_disabled: false,
                page_links_only: false,
                flaky_entry: None,
                active: None,
                page: 0,
                clicks: Vec::new(),
                visited: Vec::new(),
            },
        }
    }

    /// Every click in order, e.g. `label:icons-category-Animals`, `next`
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    /// Id of the currently applied category filter
    pub fn active_filter(&self) -> Option<String> {
        let state = self.lock();
        state.active.map(|idx| state.categories[idx].id.clone())
    }

    /// Apply a filter directly, bypassing the category controls
    pub fn force_filter(&self, label: &str) {
        let mut state = self.lock();
        let id = format!("{}{}", state.selectors.category_id_prefix, label);
        state.active = state.categories.iter().position(|c| c.id == id);
        state.page = 0;
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap()
    }

    fn node(&self, kind: NodeKind) -> MockNode {
        MockNode {
            site: Arc::clone(&self.state),
            kind,
        }
    }
}

#[async_trait]
impl Page for MockSite {
    type Node = MockNode;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        state.visited.push(url.to_string());
        state.active = None;
        state.page = 0;
        Ok(())
    }

    async fn find(&self, css: &str) -> Result<Option<MockNode>> {
        Ok(self.find_all(css).await?.into_iter().next())
    }

    async fn find_all(&self, css: &str) -> Result<Vec<MockNode>> {
        let kinds = {
            let state = self.lock();
            let s = &state.selectors;

            if css == s.category_container {
                if state.container { vec![NodeKind::Container] } else { vec![] }
            } else if css == s.icon_article {
                state.grid().into_iter().map(NodeKind::Article).collect()
            } else if s.next_page.first().map(String::as_str) == Some(css) {
                if state.active.is_some() && !state.page_links_only {
                    vec![NodeKind::Next]
                } else {
                    vec![]
                }
            } else if css == s.pagination_links {
                let pages = state.active_pages().map_or(0, <[Vec<String>]>::len);
                (1..=pages).map(NodeKind::PageLink).collect()
            } else if css == s.clear_filters_text_scan {
                if state.clear_button { vec![NodeKind::ClearButton] } else { vec![] }
            } else {
                vec![]
            }
        };

        Ok(kinds.into_iter().map(|kind| self.node(kind)).collect())
    }

    async fn wait_for_visible(&self, css: &str, _timeout: Duration) -> Result<Lookup<MockNode>> {
        Ok(match self.find(css).await? {
            Some(node) => Lookup::Found(node),
            None => Lookup::TimedOut,
        })
    }
}

impl MockNode {
    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.site.lock().unwrap()
    }

    fn child(&self, kind: NodeKind) -> MockNode {
        MockNode {
            site: Arc::clone(&self.site),
            kind,
        }
    }

    fn children(&self, css: &str) -> Vec<NodeKind> {
        let state = self.lock();
        let s = &state.selectors;

        match &self.kind {
            NodeKind::Container if css == s.category_entry => {
                (0..state.categories.len()).map(NodeKind::Entry).collect()
            }
            NodeKind::Container if css == s.category_input => {
                (0..state.categories.len()).map(NodeKind::Input).collect()
            }
            NodeKind::Container => state
                .categories
                .iter()
                .enumerate()
                .filter(|(idx, _)| state.control_visible(*idx))
                .find_map(|(idx, c)| {
                    if css == s.label_for(&c.id) {
                        Some(NodeKind::Label(idx))
                    } else if css == s.input_with_id(&c.id) {
                        Some(NodeKind::Input(idx))
                    } else {
                        None
                    }
                })
                .into_iter()
                .collect(),
            NodeKind::Article(class) if css == s.icon_glyph => vec![NodeKind::Glyph(class.clone())],
            _ => vec![],
        }
    }

    fn toggle(&self, idx: usize) {
        let mut state = self.lock();
        let id = state.categories[idx].id.clone();
        state.clicks.push(format!("label:{}", id));
        state.active = if state.active == Some(idx) { None } else { Some(idx) };
        state.page = 0;
    }
}

#[async_trait]
impl Node for MockNode {
    async fn attr(&self, name: &str) -> Result<Option<String>> {
        let state = self.lock();
        Ok(match (&self.kind, name) {
            (NodeKind::Input(idx), "id") => Some(state.categories[*idx].id.clone()),
            (NodeKind::Glyph(class), "class") if class == BROKEN_ICON => {
                return Err(BrowserError::Detached("icon glyph".to_string()));
            }
            (NodeKind::Glyph(class), "class") => Some(format!("  {}  ", class)),
            (NodeKind::Next, "disabled") if state.on_last_page() => Some(String::new()),
            (NodeKind::Next, "class") => Some("pagination-next".to_string()),
            _ => None,
        })
    }

    async fn text(&self) -> Result<String> {
        Ok(match &self.kind {
            NodeKind::PageLink(n) => format!(" {} ", n),
            NodeKind::Next => "Next".to_string(),
            NodeKind::ClearButton => "Clear all".to_string(),
            _ => String::new(),
        })
    }

    async fn click(&self) -> Result<()> {
        match &self.kind {
            NodeKind::Label(idx) | NodeKind::Input(idx) => self.toggle(*idx),
            NodeKind::Next => {
                let mut state = self.lock();
                state.clicks.push("next".to_string());
                if !state.on_last_page() {
                    state.page += 1;
                }
            }
            NodeKind::PageLink(n) => {
                let mut state = self.lock();
                state.clicks.push(format!("page:{}", n));
                state.page = n - 1;
            }
            NodeKind::ClearButton => {
                let mut state = self.lock();
                state.clicks.push("clear".to_string());
                state.active = None;
                state.page = 0;
            }
            _ => {}
        }
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        match self.kind {
            NodeKind::Entry(idx) if self.lock().flaky_entry == Some(idx) => {
                Err(BrowserError::Detached(format!("category entry {}", idx)))
            }
            _ => Ok(()),
        }
    }

    async fn find(&self, css: &str) -> Result<Option<Self>> {
        Ok(self.find_all(css).await?.into_iter().next())
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Self>> {
        Ok(self
            .children(css)
            .into_iter()
            .map(|kind| self.child(kind))
            .collect())
    }
}
