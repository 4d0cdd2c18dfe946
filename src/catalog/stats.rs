//! Request Statistics Module
//!
//! Counts single-product reads and how each one was served. The tracker is
//! created once at startup and shared with the catalog service through an
//! `Arc`; nothing here is global.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::cache::percent;

// == Stats Snapshot ==
/// Counter values as seen at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Single-product fetch attempts
    pub total_requests: u64,
    /// Fetches answered from the cache
    pub cache_hits: u64,
    /// Fetches that had to go to the store
    pub cache_misses: u64,
}

impl StatsSnapshot {
    /// `hits / total * 100`, rounded to two decimals; 0 when there were no requests.
    pub fn hit_rate(&self) -> f64 {
        percent(self.cache_hits, self.total_requests)
    }

    /// Hit rate with exactly two decimals, e.g. `"30.00"`.
    pub fn hit_rate_display(&self) -> String {
        format!("{:.2}", self.hit_rate())
    }
}

// == Request Stats ==
/// Process-lifetime request/hit/miss counters.
///
/// All three counters sit behind one mutex so a reset is observed as a single
/// step by readers. The lock is only held for the increment itself and never
/// across an await point.
#[derive(Debug, Default)]
pub struct RequestStats {
    counters: Mutex<StatsSnapshot>,
}

impl RequestStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self) -> MutexGuard<'_, StatsSnapshot> {
        // Counters stay meaningful even if a holder panicked mid-increment
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_request(&self) {
        self.counters().total_requests += 1;
    }

    pub fn record_hit(&self) {
        self.counters().cache_hits += 1;
    }

    pub fn record_miss(&self) {
        self.counters().cache_misses += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.counters()
    }

    /// Zeroes all counters. Fetches already past their increments are not
    /// rolled back.
    pub fn reset(&self) {
        *self.counters() = StatsSnapshot::default();
    }
}
