//! Engine Statistics Module
//!
//! Keyspace hit/miss counters kept by the cache engine itself. These count
//! every `get` the engine serves and are independent of the catalog's
//! per-request counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Engine Stats ==
/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
}

impl EngineStats {
    /// Hit rate in percent, rounded to two decimals; 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        percent(self.hits, self.hits + self.misses)
    }
}

// == Engine Counters ==
/// Lock-free counters updated on every lookup.
#[derive(Debug, Default)]
pub struct EngineCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EngineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        EngineStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// `part / total * 100` rounded to two decimals, or 0 when `total` is 0.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
