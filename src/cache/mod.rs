//! Cache Module
//!
//! The key-value layer the catalog uses as a lookaside cache. `CacheBackend`
//! is the contract; `MemoryCache` is the in-process engine with per-entry TTL.

mod entry;
mod memory;
mod pattern;
mod stats;

use async_trait::async_trait;

use crate::error::CacheError;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use memory::MemoryCache;
pub use pattern::glob_match;
pub use stats::{percent, EngineCounters, EngineStats};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Cache Backend ==
/// Primitives the catalog needs from a cache engine.
///
/// Implementations must be safe to call concurrently; the catalog never holds
/// a lock of its own across these calls.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the live value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value and deadline.
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl_seconds: u64)
        -> Result<(), CacheError>;

    /// Removes `key`. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every key in `keys`. Returns how many live entries were removed.
    async fn delete_many(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Lists live keys matching a Redis-style glob.
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Number of live keys in the whole namespace.
    async fn count_all(&self) -> Result<u64, CacheError>;

    /// Engine-level keyspace counters, for engines that keep them.
    async fn engine_stats(&self) -> Result<Option<EngineStats>, CacheError> {
        Ok(None)
    }
}
