//! WebDriver page source
//!
//! Pages are loaded in a real browser so client-side rendering runs before
//! extraction. One session is opened per run and reused for every page.

use crate::config::{BrowserConfig, SelectorConfig};
use crate::source::{PageOutcome, PageSource, RenderedPage};
use async_trait::async_trait;
use fantoccini::error::{CmdError, NewSessionError};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::Instant;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// What the page showed once rendering settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridState {
    Products,
    NoResults,
    TimedOut,
}

/// Fetches results pages through a WebDriver-controlled browser
///
/// Call [`BrowserSource::close`] when done. Dropping an unclosed source
/// schedules the close on the current runtime as a fallback.
pub struct BrowserSource {
    client: Option<Client>,
    grid_selector: String,
    no_results_xpath: String,
    render_timeout: Duration,
    poll_interval: Duration,
    scroll_pause: Duration,
}

impl BrowserSource {
    /// Opens a browser session on the configured WebDriver endpoint
    ///
    /// # Arguments
    ///
    /// * `config` - Browser strategy settings
    /// * `user_agent` - User agent the browser should present
    /// * `selectors` - Grid selector and "no results" marker to wait for
    pub async fn connect(
        config: &BrowserConfig,
        user_agent: &str,
        selectors: &SelectorConfig,
    ) -> Result<Self, NewSessionError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(chrome_capabilities(config, user_agent));

        tracing::info!("Connecting to WebDriver at {}", config.webdriver_url);
        let client = builder.connect(&config.webdriver_url).await?;
        tracing::info!("Browser session started");

        Ok(Self {
            client: Some(client),
            grid_selector: selectors.product_item.clone(),
            no_results_xpath: no_results_xpath(selectors),
            render_timeout: config.render_timeout(),
            poll_interval: config.poll_interval(),
            scroll_pause: config.scroll_pause(),
        })
    }

    /// Ends the browser session
    ///
    /// Safe to call more than once; only the first call talks to the driver.
    pub async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            match client.close().await {
                Ok(()) => tracing::info!("Browser session closed"),
                Err(e) => tracing::warn!("Failed to close browser session: {}", e),
            }
        }
    }

    /// Polls the DOM until the grid or the "no results" marker shows up
    async fn wait_for_grid(&self, client: &Client) -> Result<GridState, CmdError> {
        let deadline = Instant::now() + self.render_timeout;

        loop {
            if !client
                .find_all(Locator::XPath(&self.no_results_xpath))
                .await?
                .is_empty()
            {
                return Ok(GridState::NoResults);
            }

            if !client
                .find_all(Locator::Css(&self.grid_selector))
                .await?
                .is_empty()
            {
                return Ok(GridState::Products);
            }

            if Instant::now() >= deadline {
                return Ok(GridState::TimedOut);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn render(&self, client: &Client, url: &str) -> Result<PageOutcome, CmdError> {
        client.goto(url).await?;

        match self.wait_for_grid(client).await? {
            GridState::NoResults => return Ok(PageOutcome::NoResults),
            GridState::TimedOut => {
                return Ok(PageOutcome::failed(format!(
                    "page did not render within {}s",
                    self.render_timeout.as_secs()
                )))
            }
            GridState::Products => {}
        }

        // Lazily loaded entries only materialize once scrolled into view
        client.execute(SCROLL_TO_BOTTOM, vec![]).await?;
        tokio::time::sleep(self.scroll_pause).await;

        let html = client.source().await?;
        let current_url = client.current_url().await?;

        Ok(PageOutcome::Rendered(RenderedPage::new(current_url, html)))
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&mut self, url: &str) -> PageOutcome {
        let Some(client) = self.client.clone() else {
            return PageOutcome::failed("browser session is closed");
        };

        match self.render(&client, url).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Error rendering page {}: {}", url, e);
                PageOutcome::failed(e.to_string())
            }
        }
    }
}

impl Drop for BrowserSource {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };

        tracing::warn!("Browser session dropped without being closed");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    tracing::warn!("Failed to close browser session: {}", e);
                }
            });
        }
    }
}

/// Builds Chrome capabilities for the session
fn chrome_capabilities(config: &BrowserConfig, user_agent: &str) -> Map<String, Value> {
    let mut args: Vec<String> = Vec::new();
    if config.headless {
        args.push("--headless".to_string());
    }
    args.extend(config.extra_args.iter().cloned());
    args.push(format!("user-agent={}", user_agent));

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// XPath matching the "no results" message element
fn no_results_xpath(selectors: &SelectorConfig) -> String {
    format!(
        "//{}[contains(text(), '{}')]",
        selectors.no_results_tag, selectors.no_results_text
    )
}
