use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_SEARCH_URL: &str = "https://www.sony.co.uk/store/search?query=:relevance:normalSearch:true:category:gwx-audio:category:gwx-headphones";
const DEFAULT_BASE_URL: &str = "https://www.sony.co.uk";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Catalog-Sweep
///
/// Every section falls back to its defaults when omitted, so an empty file
/// (or no file at all) describes the stock headphone feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The search feed being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Search results URL for the first page (no page parameter)
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Site root used when synthesizing product URLs
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path under `base_url` where product pages live
    #[serde(rename = "product-path")]
    pub product_path: String,

    /// Query parameter carrying the zero-based page index
    #[serde(rename = "page-param")]
    pub page_param: String,

    /// Currency symbol that prefixes prices on the page
    #[serde(rename = "currency-symbol")]
    pub currency_symbol: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            product_path: "/store/product".to_string(),
            page_param: "currentPage".to_string(),
            currency_symbol: "£".to_string(),
        }
    }
}

/// CSS selectors and markers used by the extractor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per product entry
    #[serde(rename = "product-item")]
    pub product_item: String,

    /// Product name, relative to the product entry
    pub name: String,

    /// Price text, relative to the product entry
    pub price: String,

    /// Manufacturer part number, relative to the product entry
    pub mpn: String,

    /// Anchor whose `href` is the product URL (browser strategy)
    #[serde(rename = "product-link")]
    pub product_link: String,

    /// Tag name of the element carrying the "no results" message
    #[serde(rename = "no-results-tag")]
    pub no_results_tag: String,

    /// Text identifying the "no results" message
    #[serde(rename = "no-results-text")]
    pub no_results_text: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_item: "sn-product-grid-item".to_string(),
            name: ".sn-product-grid__name a".to_string(),
            price: ".cx-product-price".to_string(),
            mpn: ".cx-sku".to_string(),
            product_link: ".sn-product-grid__image-container a".to_string(),
            no_results_tag: "span".to_string(),
            no_results_text: "We could not find anything matching for".to_string(),
        }
    }
}

/// HTTP strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request (also used by the browser)
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per page, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            retry_delay_ms: 5_000,
            headers: BTreeMap::new(),
        }
    }
}

/// Browser strategy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver listens on 9515 by default)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Additional Chrome command-line arguments
    #[serde(rename = "extra-args")]
    pub extra_args: Vec<String>,

    /// Upper bound on waiting for the grid or the "no results" marker (seconds)
    #[serde(rename = "render-timeout-secs")]
    pub render_timeout_secs: u64,

    /// Interval between DOM checks while waiting (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Pause after scrolling to the bottom of the page (milliseconds)
    #[serde(rename = "scroll-pause-ms")]
    pub scroll_pause_ms: u64,
}

impl BrowserConfig {
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            extra_args: vec!["--disable-gpu".to_string()],
            render_timeout_secs: 30,
            poll_interval_ms: 250,
            scroll_pause_ms: 1_000,
        }
    }
}

/// Pagination behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Delay before moving on to the next page (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Consecutive zero-record pages that end an HTTP run
    #[serde(rename = "max-empty-pages")]
    pub max_empty_pages: u32,

    /// Hard cap on pages processed in one run
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,
}

impl PaginationConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 2_000,
            max_empty_pages: 2,
            max_pages: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file; each strategy has its own default when unset
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,
}
