//! The pagination loop
//!
//! Walks results pages from page 0, hands each one to the extractor, keeps
//! the records in page order and asks the stop tracker whether to go on.

use crate::config::SweepConfig;
use crate::extract::{Extraction, Extractor};
use crate::harvest::policy::{StopPolicy, StopReason, StopTracker, Transition};
use crate::harvest::Harvest;
use crate::output::HarvestStats;
use crate::record::ProductRecord;
use crate::source::{PageOutcome, PageSource};
use crate::url::page_url;
use std::time::Duration;

/// Drives a [`PageSource`] across the pages of the search feed
#[derive(Debug, Clone)]
pub struct Paginator {
    search_url: String,
    page_param: String,
    page_delay: Duration,
    max_pages: Option<u32>,
    extractor: Extractor,
    policy: StopPolicy,
}

impl Paginator {
    pub fn new(config: &SweepConfig, extractor: Extractor, policy: StopPolicy) -> Self {
        Self {
            search_url: config.target.search_url.clone(),
            page_param: config.target.page_param.clone(),
            page_delay: config.pagination.page_delay(),
            max_pages: config.pagination.max_pages,
            extractor,
            policy,
        }
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// URL of the zero-based `page`
    pub fn page_url(&self, page: u32) -> String {
        page_url(&self.search_url, &self.page_param, page)
    }

    /// Runs the loop to completion
    ///
    /// Never fails: unavailable pages count as pages without records, and
    /// whatever was collected before the stop is returned.
    pub async fn run(&self, source: &mut dyn PageSource) -> Harvest {
        let mut stats = HarvestStats::new(source.name());
        let mut records: Vec<ProductRecord> = Vec::new();
        let mut tracker = StopTracker::new(self.policy);
        let mut page: u32 = 0;

        let reason = loop {
            let url = self.page_url(page);
            tracing::info!("Scraping page {}: {}", page + 1, url);

            let found = self.process_page(source, &url, &mut stats).await;
            let found_count = found.len();
            records.extend(found);

            if let Transition::Stop(reason) = tracker.observe(found_count) {
                tracing::info!("No products found on page {}. Stopping ({})", page + 1, reason);
                break reason;
            }

            if found_count == 0 {
                if let StopPolicy::ConsecutiveEmpty { threshold } = self.policy {
                    tracing::info!(
                        "No products found on page {}. Empty page count: {}/{}",
                        page + 1,
                        tracker.consecutive_empty(),
                        threshold
                    );
                }
            }

            if let Some(max_pages) = self.max_pages {
                if page + 1 >= max_pages {
                    tracing::info!("Reached page limit of {}. Stopping.", max_pages);
                    break StopReason::PageLimit { pages: max_pages };
                }
            }

            page += 1;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        };

        stats.finish(reason);
        Harvest { records, stats }
    }

    /// Fetches and extracts one page, recording what happened
    async fn process_page(
        &self,
        source: &mut dyn PageSource,
        url: &str,
        stats: &mut HarvestStats,
    ) -> Vec<ProductRecord> {
        let page = match source.fetch(url).await {
            PageOutcome::Rendered(page) => page,
            PageOutcome::NoResults => {
                tracing::info!("No products found at {}", url);
                stats.record_no_results();
                return Vec::new();
            }
            PageOutcome::Failed { reason } => {
                tracing::warn!("Page {} unavailable: {}", url, reason);
                stats.record_failure();
                return Vec::new();
            }
        };

        match self.extractor.scan(&page) {
            Extraction::NoResults => {
                tracing::info!("No products found at {}", url);
                stats.record_no_results();
                Vec::new()
            }
            Extraction::Products(found) => {
                tracing::debug!("Extracted {} products from {}", found.len(), url);
                stats.record_products(&found);
                found
            }
        }
    }
}
