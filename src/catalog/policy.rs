//! Cache key and TTL policy for product snapshots.

use crate::config::Config;

/// How product ids map onto cache keys and how long snapshots live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    prefix: String,
    ttl_seconds: u64,
}

impl CachePolicy {
    /// A zero TTL is raised to one second; snapshots always expire.
    pub fn new(prefix: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            prefix: prefix.into(),
            ttl_seconds: ttl_seconds.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_prefix.clone(), config.cache_ttl)
    }

    /// Cache key holding the snapshot of product `id`.
    pub fn key_for(&self, id: i64) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Glob matching every product snapshot key.
    pub fn pattern(&self) -> String {
        format!("{}*", self.prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
