//! Browser capability layer.
//!
//! The scraper talks to the catalog only through the [`Page`] and [`Node`]
//! traits. [`WebDriverPage`] implements them over a live WebDriver session;
//! tests substitute a simulated page.

pub mod error;
pub mod locator;
pub mod webdriver;

pub use error::{BrowserError, Result};
pub use locator::{Locator, Lookup};
pub use webdriver::WebDriverPage;

use async_trait::async_trait;
use std::time::Duration;

/// A handle to one element of the current document.
///
/// Handles go stale when the page re-renders; resolve a fresh one through a
/// [`Locator`] instead of holding on to it across awaits.
#[async_trait]
pub trait Node: Send + Sync + Sized {
    /// Attribute value, `None` when the attribute is absent
    async fn attr(&self, name: &str) -> Result<Option<String>>;

    /// Rendered text content
    async fn text(&self) -> Result<String>;

    async fn click(&self) -> Result<()>;

    async fn scroll_into_view(&self) -> Result<()>;

    /// First descendant matching `css`
    async fn find(&self, css: &str) -> Result<Option<Self>>;

    /// All descendants matching `css`, in document order
    async fn find_all(&self, css: &str) -> Result<Vec<Self>>;
}

/// A loaded browser page
#[async_trait]
pub trait Page: Send + Sync {
    type Node: Node;

    async fn goto(&self, url: &str) -> Result<()>;

    /// First element in the document matching `css`
    async fn find(&self, css: &str) -> Result<Option<Self::Node>>;

    /// All elements in the document matching `css`, in document order
    async fn find_all(&self, css: &str) -> Result<Vec<Self::Node>>;

    /// Wait until an element matching `css` is visible, giving up after
    /// `timeout` with [`Lookup::TimedOut`].
    async fn wait_for_visible(&self, css: &str, timeout: Duration) -> Result<Lookup<Self::Node>>;
}
