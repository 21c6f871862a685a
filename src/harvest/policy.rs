//! Stopping rules for the pagination loop

use std::fmt;

/// When a run stops advancing to further pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopPolicy {
    /// Stop after `threshold` zero-record pages in a row; any page with
    /// records resets the count. An empty page may be a parse or transport
    /// failure rather than the real end of the feed, hence the tolerance.
    ConsecutiveEmpty { threshold: u32 },

    /// Stop at the first zero-record page.
    FirstEmpty,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `count` zero-record pages in a row
    EmptyPages { count: u32 },
    /// A single zero-record page under [`StopPolicy::FirstEmpty`]
    FirstEmptyPage,
    /// The configured page cap was reached
    PageLimit { pages: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPages { count } => write!(f, "{} consecutive empty pages", count),
            StopReason::FirstEmptyPage => write!(f, "empty page"),
            StopReason::PageLimit { pages } => write!(f, "page limit of {} reached", pages),
        }
    }
}

/// Outcome of observing one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Stop(StopReason),
}

/// Applies a [`StopPolicy`] across the pages of a run
#[derive(Debug, Clone)]
pub struct StopTracker {
    policy: StopPolicy,
    consecutive_empty: u32,
}

impl StopTracker {
    pub fn new(policy: StopPolicy) -> Self {
        Self {
            policy,
            consecutive_empty: 0,
        }
    }

    /// Zero-record pages seen since the last page with records
    pub fn consecutive_empty(&self) -> u32 {
        self.consecutive_empty
    }

    /// Records how many products the latest page yielded
    pub fn observe(&mut self, records_found: usize) -> Transition {
        if records_found > 0 {
            self.consecutive_empty = 0;
            return Transition::Continue;
        }

        self.consecutive_empty += 1;
        match self.policy {
            StopPolicy::ConsecutiveEmpty { threshold } if self.consecutive_empty >= threshold => {
                Transition::Stop(StopReason::EmptyPages {
                    count: self.consecutive_empty,
                })
            }
            StopPolicy::ConsecutiveEmpty { .. } => Transition::Continue,
            StopPolicy::FirstEmpty => Transition::Stop(StopReason::FirstEmptyPage),
        }
    }
}
