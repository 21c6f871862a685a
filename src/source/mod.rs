//! Page sources: how a results page gets from the network into memory
//!
//! Two implementations share one contract:
//! - [`HttpSource`] fetches raw HTML with retry and exponential backoff
//! - [`BrowserSource`] drives a WebDriver session and waits for client-side
//!   rendering before capturing the page source

mod browser;
mod http;

pub use browser::BrowserSource;
pub use http::{build_http_client, HttpSource, RetryPolicy};

use async_trait::async_trait;
use url::Url;

/// A fully rendered results page, ready for extraction
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL of the page (after redirects or client-side navigation)
    pub url: Url,

    /// Page markup
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }
}

/// Result of fetching one results page
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was obtained and can be handed to the extractor
    Rendered(RenderedPage),

    /// The source saw the "no results" marker while loading the page
    NoResults,

    /// The page could not be obtained
    Failed {
        /// Human-readable reason
        reason: String,
    },
}

impl PageOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// A way of acquiring results pages
///
/// Implementations never fail past their own boundary: transport and
/// rendering problems are reported as [`PageOutcome::Failed`].
#[async_trait]
pub trait PageSource: Send {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Obtains the page at `url`
    async fn fetch(&mut self, url: &str) -> PageOutcome;
}
