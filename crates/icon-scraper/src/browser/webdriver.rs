//! WebDriver backend.
//!
//! Drives Chrome through a running WebDriver server (chromedriver) using
//! fantoccini. Lookups go through `find_all` so an absent element is an empty
//! result rather than an error.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator as By};
use serde_json::json;
use shared::ScraperConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::{BrowserError, Lookup, Node, Page, Result};

const VISIBILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});";

/// A browser tab controlled over WebDriver
pub struct WebDriverPage {
    client: Client,
    page_load_timeout: Duration,
}

impl WebDriverPage {
    /// Start a new Chrome session on the configured WebDriver server
    pub async fn connect(config: &ScraperConfig) -> Result<Self> {
        let mut args = vec![
            format!("--window-size={},{}", config.window_width, config.window_height),
            format!("--user-agent={}", config.user_agent),
            "--disable-gpu".to_string(),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("browserName".to_string(), json!("chrome"));
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        info!(
            webdriver_url = %config.webdriver_url,
            headless = config.headless,
            "Launching browser"
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder.connect(&config.webdriver_url).await?;

        // The driver enforces the page load bound itself, so a slow page
        // never leaves a navigation running behind later commands
        let page_load_timeout = config.timings.page_load_timeout();
        client
            .update_timeouts(TimeoutConfiguration::new(None, Some(page_load_timeout), None))
            .await?;

        Ok(Self {
            client,
            page_load_timeout,
        })
    }

    /// End the WebDriver session, closing the browser
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    fn node(&self, element: Element) -> WebNode {
        WebNode {
            client: self.client.clone(),
            element,
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Node = WebNode;

    async fn goto(&self, url: &str) -> Result<()> {
        match self.client.goto(url).await {
            Ok(()) => Ok(()),
            Err(e) if is_timeout(&e) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: self.page_load_timeout.as_millis() as u64,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, css: &str) -> Result<Option<WebNode>> {
        Ok(self.find_all(css).await?.into_iter().next())
    }

    async fn find_all(&self, css: &str) -> Result<Vec<WebNode>> {
        let elements = self.client.find_all(By::Css(css)).await?;
        Ok(elements.into_iter().map(|e| self.node(e)).collect())
    }

    async fn wait_for_visible(&self, css: &str, timeout: Duration) -> Result<Lookup<WebNode>> {
        let client = &self.client;
        let found = poll_until_visible(css, timeout, || async move {
            let mut visible = None;
            for element in client.find_all(By::Css(css)).await? {
                match element.is_displayed().await {
                    Ok(true) => {
                        visible = Some(element);
                        break;
                    }
                    Ok(false) => {}
                    // Replaced by a re-render between listing and checking
                    Err(e) => debug!(selector = %css, error = %e, "Skipping stale element"),
                }
            }
            Ok::<_, BrowserError>(visible)
        })
        .await;
        Ok(found.map(|element| self.node(element)))
    }
}

/// Whether the driver gave up on a command because of its own timeout
fn is_timeout(error: &CmdError) -> bool {
    matches!(error, CmdError::Standard(e) if matches!(e.error, ErrorStatus::Timeout))
}

/// Run `check` until it reports a match or `timeout` passes.
///
/// A failed check counts as "not visible yet"; only the deadline ends the
/// wait without a match.
async fn poll_until_visible<T, F, Fut>(selector: &str, timeout: Duration, mut check: F) -> Lookup<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        match check().await {
            Ok(Some(found)) => return Lookup::Found(found),
            Ok(None) => {}
            Err(e) => debug!(selector = %selector, error = %e, "Visibility check failed, retrying"),
        }

        if Instant::now() >= deadline {
            debug!(
                selector = %selector,
                timeout_ms = timeout.as_millis() as u64,
                "Element never became visible"
            );
            return Lookup::TimedOut;
        }
        sleep(VISIBILITY_POLL_INTERVAL).await;
    }
}

/// An element handle bound to its session
pub struct WebNode {
    client: Client,
    element: Element,
}

#[async_trait]
impl Node for WebNode {
    async fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(self.element.attr(name).await?)
    }

    async fn text(&self) -> Result<String> {
        Ok(self.element.text().await?)
    }

    async fn click(&self) -> Result<()> {
        Ok(self.element.click().await?)
    }

    async fn scroll_into_view(&self) -> Result<()> {
        let target = serde_json::to_value(&self.element)?;
        self.client.execute(SCROLL_INTO_VIEW, vec![target]).await?;
        Ok(())
    }

    async fn find(&self, css: &str) -> Result<Option<Self>> {
        Ok(self.find_all(css).await?.into_iter().next())
    }

    async fn find_all(&self, css: &str) -> Result<Vec<Self>> {
        let elements = self.element.find_all(By::Css(css)).await?;
        Ok(elements
            .into_iter()
            .map(|element| WebNode {
                client: self.client.clone(),
                element,
            })
            .collect())
    }
}
