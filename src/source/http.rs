//! HTTP page source
//!
//! This module handles all plain HTTP requests, including:
//! - Building the HTTP client with a browser-like user agent and fixed headers
//! - GET requests for results pages
//! - Retry with exponential backoff on transport errors and non-2xx statuses

use crate::config::HttpConfig;
use crate::source::{PageOutcome, PageSource, RenderedPage};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay after the first failed attempt; doubles after each further one
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to sleep after the zero-based `attempt` failed
    ///
    /// Returns None after the final attempt, which is never followed by a sleep.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(
            self.base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        )
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The HTTP strategy configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use catalog_sweep::config::HttpConfig;
/// use catalog_sweep::source::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        // Validated with the rest of the config; anything unusable is skipped
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}'", name),
        }
    }

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10).min(config.timeout()))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches results pages over plain HTTP
pub struct HttpSource {
    client: Client,
    retry: RetryPolicy,
}

impl HttpSource {
    /// Creates a source from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?, RetryPolicy::from(config)))
    }

    /// Creates a source around an existing client
    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// One GET request; any non-2xx status counts as a failed attempt
    async fn attempt(&self, url: &str) -> Result<RenderedPage, AttemptError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let body = response.text().await?;

        Ok(RenderedPage::new(final_url, body))
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    /// Fetches a page, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the page |
    /// | Non-2xx status | Retry with backoff |
    /// | Timeout / connection error | Retry with backoff |
    /// | Attempts exhausted | `PageOutcome::Failed` |
    async fn fetch(&mut self, url: &str) -> PageOutcome {
        let max_attempts = self.retry.max_attempts;

        for attempt in 0..max_attempts {
            match self.attempt(url).await {
                Ok(page) => return PageOutcome::Rendered(page),
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt + 1,
                        max_attempts,
                        url,
                        e
                    );
                    if let Some(delay) = self.retry.delay_after(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(
            "Failed to fetch page {} after {} attempts",
            url,
            max_attempts
        );
        PageOutcome::failed(format!("gave up after {} attempts", max_attempts))
    }
}
