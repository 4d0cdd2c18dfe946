//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default cache key prefix for product snapshots
pub const DEFAULT_CACHE_PREFIX: &str = "product:";

/// Default TTL in seconds for cached product snapshots (10 minutes)
pub const DEFAULT_CACHE_TTL: u64 = 600;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to every product id to form its cache key
    pub cache_prefix: String,
    /// TTL in seconds for snapshots written on a cache miss
    pub cache_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Insert a handful of demo products at startup
    pub seed_demo_data: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Cache key prefix (default: "product:")
    /// - `CACHE_TTL` - Snapshot TTL in seconds, must be positive (default: 600)
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `SEED_DEMO_DATA` - "true"/"1" to seed demo products (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_prefix: env::var("CACHE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_prefix),
            cache_ttl: parse_var::<u64>("CACHE_TTL")
                .filter(|ttl| *ttl > 0)
                .unwrap_or(defaults.cache_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed_demo_data),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            server_port: 5000,
            cleanup_interval: 1,
            seed_demo_data: false,
        }
    }
}
