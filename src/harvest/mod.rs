//! Harvest orchestration
//!
//! A run picks a page source for the chosen [`Strategy`], drives it with the
//! [`Paginator`] and hands back every record collected along the way.

mod paginator;
mod policy;

pub use paginator::Paginator;
pub use policy::{StopPolicy, StopReason, StopTracker, Transition};

use crate::config::{PaginationConfig, SweepConfig};
use crate::extract::{Extractor, LinkMode};
use crate::output::HarvestStats;
use crate::record::ProductRecord;
use crate::source::{BrowserSource, HttpSource};
use crate::Result;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;

/// How results pages are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Plain HTTP requests; the server-rendered markup is parsed directly
    #[default]
    Http,
    /// A WebDriver-controlled browser; client-side rendering runs first
    Browser,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Http => "http",
            Strategy::Browser => "browser",
        }
    }

    /// Output file used when neither the CLI nor the config names one
    pub fn default_output(self) -> &'static str {
        match self {
            Strategy::Http => "sony_headphones.csv",
            Strategy::Browser => "sony_headphones_selenium.csv",
        }
    }

    /// Where record URLs come from
    ///
    /// Server-rendered anchors are unreliable, so the HTTP strategy builds
    /// product URLs itself.
    pub fn link_mode(self) -> LinkMode {
        match self {
            Strategy::Http => LinkMode::Synthesized,
            Strategy::Browser => LinkMode::Anchor,
        }
    }

    pub fn stop_policy(self, pagination: &PaginationConfig) -> StopPolicy {
        match self {
            Strategy::Http => StopPolicy::ConsecutiveEmpty {
                threshold: pagination.max_empty_pages,
            },
            Strategy::Browser => StopPolicy::FirstEmpty,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Strategy::Http),
            "browser" | "selenium" => Ok(Strategy::Browser),
            other => Err(format!("unknown strategy '{}' (expected http or browser)", other)),
        }
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct Harvest {
    /// Records in page order, then document order within a page
    pub records: Vec<ProductRecord>,

    /// Run statistics
    pub stats: HarvestStats,
}

/// Runs a full harvest with the given strategy
///
/// Page-level problems never surface here; they end up as pages without
/// records. Only setup failures (invalid selectors, an unbuildable HTTP
/// client, an unreachable WebDriver endpoint) are returned as errors.
///
/// The browser session is closed on every exit path, including a panic
/// inside the pagination loop, which is resumed after the close.
pub async fn run_harvest(config: &SweepConfig, strategy: Strategy) -> Result<Harvest> {
    let extractor = Extractor::new(&config.target, &config.selectors, strategy.link_mode())?;
    let paginator = Paginator::new(config, extractor, strategy.stop_policy(&config.pagination));

    tracing::info!("Starting {} harvest of {}", strategy, config.target.search_url);

    let harvest = match strategy {
        Strategy::Http => {
            let mut source = HttpSource::new(&config.http)?;
            paginator.run(&mut source).await
        }
        Strategy::Browser => {
            let mut source =
                BrowserSource::connect(&config.browser, &config.http.user_agent, &config.selectors)
                    .await?;

            let outcome = AssertUnwindSafe(paginator.run(&mut source))
                .catch_unwind()
                .await;
            source.close().await;

            match outcome {
                Ok(harvest) => harvest,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }
    };

    harvest.stats.log_summary();
    Ok(harvest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SweepError;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("http".parse::<Strategy>(), Ok(Strategy::Http));
        assert_eq!("Browser".parse::<Strategy>(), Ok(Strategy::Browser));
        assert_eq!("selenium".parse::<Strategy>(), Ok(Strategy::Browser));
        assert!("curl".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_defaults() {
        assert_eq!(Strategy::default(), Strategy::Http);
        assert_eq!(Strategy::Http.default_output(), "sony_headphones.csv");
        assert_eq!(
            Strategy::Browser.default_output(),
            "sony_headphones_selenium.csv"
        );
        assert_eq!(Strategy::Http.link_mode(), LinkMode::Synthesized);
        assert_eq!(Strategy::Browser.link_mode(), LinkMode::Anchor);
    }

    #[test]
    fn test_stop_policies_stay_distinct() {
        let pagination = PaginationConfig::default();
        assert_eq!(
            Strategy::Http.stop_policy(&pagination),
            StopPolicy::ConsecutiveEmpty { threshold: 2 }
        );
        assert_eq!(
            Strategy::Browser.stop_policy(&pagination),
            StopPolicy::FirstEmpty
        );
    }

    #[tokio::test]
    async fn test_invalid_selector_fails_before_fetching() {
        let mut config = SweepConfig::default();
        config.selectors.price = "<<".to_string();

        let result = run_harvest(&config, Strategy::Http).await;
        assert!(matches!(result, Err(SweepError::Config(_))));
    }
}
