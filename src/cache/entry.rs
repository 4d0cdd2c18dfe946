//! Cache Entry Module
//!
//! Defines the structure for individual cache entries. Every entry expires.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A stored value together with its write time and expiration deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Write timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration deadline (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    /// Creates an entry that expires `ttl_seconds` after now.
    pub fn new(value: Vec<u8>, ttl_seconds: u64) -> Self {
        let now = current_timestamp_ms();

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline, so a
    /// TTL that has fully elapsed never reads as live.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    /// Remaining lifetime in milliseconds, zero once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
