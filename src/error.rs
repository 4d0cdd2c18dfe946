//! Error types for the product catalog service
//!
//! Each layer has its own thiserror enum; `CatalogError` is the one callers of
//! the catalog see and the one the HTTP layer turns into responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// == Cache Error ==
/// Failures reported by a cache backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key rejected by the backend (empty or too long)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Value exceeds the backend size limit
    #[error("Value too large: {0} bytes")]
    ValueTooLarge(usize),

    /// Entries must expire; a zero TTL is rejected
    #[error("TTL must be positive")]
    InvalidTtl,

    /// Backend could not be reached or timed out
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Anything else the backend reports
    #[error("Cache internal error: {0}")]
    Internal(String),
}

// == Store Error ==
/// Failures reported by the durable product store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store could not be reached or timed out
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A constraint was violated (e.g. duplicate name)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Query could not be executed
    #[error("Query failed: {0}")]
    Query(String),
}

// == Codec Error ==
/// Failures while encoding or decoding cached product snapshots.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
}

// == Catalog Error ==
/// Unified error type returned by the catalog service and HTTP handlers.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No product with this identifier
    #[error("Product not found: {0}")]
    NotFound(i64),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Durable store failure, fatal for the current request
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cache failure on an administrative path
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The store mutation went through but the cached snapshot could not be
    /// removed, so readers may see stale data until the entry expires.
    #[error("Product {id} was modified but its cache entry could not be invalidated: {source}")]
    InvalidationFailed {
        id: i64,
        #[source]
        source: CacheError,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CatalogError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "Product not found".to_string())
            }
            CatalogError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CatalogError::Store(StoreError::Constraint(_)) => (
                StatusCode::CONFLICT,
                "Product conflicts with an existing record".to_string(),
            ),
            CatalogError::InvalidationFailed { id, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Product {id} was modified but its cache entry could not be cleared"),
            ),
            CatalogError::Store(_) | CatalogError::Cache(_) | CatalogError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog service.
pub type Result<T> = std::result::Result<T, CatalogError>;
