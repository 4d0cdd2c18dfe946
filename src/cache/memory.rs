//! In-Memory Cache Engine
//!
//! HashMap storage with per-entry TTL and keyspace hit/miss counters.
//! Expired entries read as absent, are dropped lazily on lookup, and are
//! swept in bulk by the cleanup task.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{
    current_timestamp_ms, glob_match, CacheBackend, CacheEntry, EngineCounters, EngineStats,
    MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};
use crate::error::CacheError;

// == Memory Cache ==
/// Process-local cache engine.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Keyspace hit/miss counters
    counters: EngineCounters,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => {
                    self.counters.record_hit();
                    return Ok(Some(entry.value.clone()));
                }
                None => {
                    self.counters.record_miss();
                    return Ok(None);
                }
                Some(_) => {}
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        self.counters.record_miss();
        Ok(None)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        validate_key(key)?;
        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::ValueTooLarge(value.len()));
        }
        if ttl_seconds == 0 {
            return Err(CacheError::InvalidTtl);
        }

        let entry = CacheEntry::new(value, ttl_seconds);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired()))
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired_at(now))
            .count();
        Ok(removed as u64)
    }

    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired_at(now) && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn count_all(&self) -> Result<u64, CacheError> {
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;
        let live = entries.values().filter(|e| !e.is_expired_at(now)).count();
        Ok(live as u64)
    }

    async fn engine_stats(&self) -> Result<Option<EngineStats>, CacheError> {
        Ok(Some(self.counters.snapshot()))
    }
}
