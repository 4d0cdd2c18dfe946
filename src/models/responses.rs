//! Response DTOs for the catalog API
//!
//! Every body is an envelope with a `success` flag, matching what the
//! frontend expects.

use serde::Serialize;

use crate::catalog::{CacheSnapshot, DataSource, Fetched, Population, ProductPage, StatsSnapshot};
use crate::models::Product;

/// Cache details attached to a single-product read.
#[derive(Debug, Clone, Serialize)]
pub struct FetchCacheInfo {
    pub hit: bool,
    pub source: DataSource,
    pub population: Population,
    /// TTL in seconds applied to snapshots
    pub ttl: u64,
}

/// Response body for GET /api/products/:id
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub data: Product,
    pub cache: FetchCacheInfo,
}

impl ProductResponse {
    pub fn new(fetched: Fetched, ttl: u64) -> Self {
        Self {
            success: true,
            data: fetched.product,
            cache: FetchCacheInfo {
                hit: fetched.provenance.hit,
                source: fetched.provenance.source,
                population: fetched.provenance.population,
                ttl,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCacheInfo {
    pub source: DataSource,
}

/// Response body for GET /api/products
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub data: Vec<Product>,
    pub pagination: Pagination,
    pub cache: ListCacheInfo,
}

impl ProductListResponse {
    pub fn new(page: ProductPage) -> Self {
        Self {
            success: true,
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                pages: page.pages,
            },
            data: page.products,
            cache: ListCacheInfo {
                source: DataSource::Store,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidationInfo {
    pub invalidated: bool,
}

/// Response body for create, update and delete
#[derive(Debug, Clone, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Product>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<InvalidationInfo>,
}

impl MutationResponse {
    pub fn created(product: Product) -> Self {
        Self {
            message: format!("Product {} created successfully", product.id),
            success: true,
            data: Some(product),
            cache: None,
        }
    }

    pub fn updated(product: Product) -> Self {
        Self {
            message: format!("Product {} updated successfully", product.id),
            success: true,
            data: Some(product),
            cache: Some(InvalidationInfo { invalidated: true }),
        }
    }

    pub fn deleted(id: i64) -> Self {
        Self {
            success: true,
            data: None,
            message: format!("Product {} deleted successfully", id),
            cache: Some(InvalidationInfo { invalidated: true }),
        }
    }
}

/// Response body for GET /api/products/categories
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub data: Vec<String>,
}

impl CategoriesResponse {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            success: true,
            data: categories,
        }
    }
}

/// Request-scoped counters as reported to callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Percentage with two decimals, e.g. "30.00"
    pub hit_rate: String,
}

/// Cache occupancy plus the engine's own counters, when it keeps any
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEngineStats {
    pub cached_products: u64,
    pub total_keys: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misses: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsData {
    pub application: ApplicationStats,
    pub cache: CacheEngineStats,
}

/// Response body for GET /api/products/stats/cache
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: StatsData,
}

impl StatsResponse {
    pub fn new(requests: StatsSnapshot, cache: CacheSnapshot) -> Self {
        let engine = cache.engine;
        Self {
            success: true,
            data: StatsData {
                application: ApplicationStats {
                    total_requests: requests.total_requests,
                    cache_hits: requests.cache_hits,
                    cache_misses: requests.cache_misses,
                    hit_rate: requests.hit_rate_display(),
                },
                cache: CacheEngineStats {
                    cached_products: cache.cached_products,
                    total_keys: cache.total_keys,
                    hits: engine.map(|e| e.hits),
                    misses: engine.map(|e| e.misses),
                    hit_rate: engine.map(|e| format!("{:.2}", e.hit_rate())),
                },
            },
        }
    }
}

/// Response body for administrative actions
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub service: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            service: "Product Catalog API".to_string(),
        }
    }
}
