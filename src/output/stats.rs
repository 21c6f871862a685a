//! Per-run harvest statistics
//!
//! Collected by the paginator while a run progresses and logged once the
//! run stops.

use crate::harvest::StopReason;
use crate::record::ProductRecord;
use chrono::{DateTime, Utc};

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStats {
    /// Name of the page source used for the run
    pub source: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run stopped (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages requested, whatever their outcome
    pub pages_processed: u32,

    /// Pages that yielded at least one record
    pub pages_with_products: u32,

    /// Pages that yielded no records (includes no-results and failed pages)
    pub empty_pages: u32,

    /// Pages showing the "no results" message
    pub no_results_pages: u32,

    /// Pages that could not be obtained
    pub failed_pages: u32,

    /// Records collected
    pub records: usize,

    /// Records with at least one sentinel field
    pub incomplete_records: usize,

    /// Why the run stopped
    pub stop_reason: Option<StopReason>,
}

impl HarvestStats {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            started_at: Utc::now(),
            finished_at: None,
            pages_processed: 0,
            pages_with_products: 0,
            empty_pages: 0,
            no_results_pages: 0,
            failed_pages: 0,
            records: 0,
            incomplete_records: 0,
            stop_reason: None,
        }
    }

    /// Records a page that was extracted, with or without entries
    pub fn record_products(&mut self, found: &[ProductRecord]) {
        self.pages_processed += 1;
        if found.is_empty() {
            self.empty_pages += 1;
            return;
        }

        self.pages_with_products += 1;
        self.records += found.len();
        self.incomplete_records += found.iter().filter(|r| !r.is_complete()).count();
    }

    /// Records a page showing the "no results" message
    pub fn record_no_results(&mut self) {
        self.pages_processed += 1;
        self.empty_pages += 1;
        self.no_results_pages += 1;
    }

    /// Records a page that could not be obtained
    pub fn record_failure(&mut self) {
        self.pages_processed += 1;
        self.empty_pages += 1;
        self.failed_pages += 1;
    }

    /// Marks the run as stopped
    pub fn finish(&mut self, reason: StopReason) {
        self.finished_at = Some(Utc::now());
        self.stop_reason = Some(reason);
    }

    /// Seconds between start and stop, if the run has stopped
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Logs the summary at info level
    pub fn log_summary(&self) {
        let stop = self
            .stop_reason
            .map(|reason| reason.to_string())
            .unwrap_or_else(|| "still running".to_string());

        tracing::info!(
            "Harvest ({}) finished after {} pages: {}",
            self.source,
            self.pages_processed,
            stop
        );
        tracing::info!(
            "  Pages with products: {}, empty: {} (no results: {}, failed: {})",
            self.pages_with_products,
            self.empty_pages,
            self.no_results_pages,
            self.failed_pages
        );
        tracing::info!(
            "  Records: {} ({} incomplete)",
            self.records,
            self.incomplete_records
        );
        if let Some(seconds) = self.duration_seconds() {
            tracing::info!("  Duration: {}s", seconds);
        }
    }
}
