//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint. Handlers only translate
//! between HTTP and the catalog service.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheBackend;
use crate::catalog::{CachePolicy, CatalogService, RequestStats};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    CategoriesResponse, HealthResponse, ListQuery, MessageResponse, MutationResponse,
    ProductFields, ProductListResponse, ProductRequest, ProductResponse, StatsResponse,
};
use crate::store::ProductStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Wires a catalog service over the given backends, with fresh request
    /// statistics and the cache policy from `config`.
    pub fn with_backends(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn CacheBackend>,
        config: &Config,
    ) -> Self {
        Self::new(CatalogService::new(
            store,
            cache,
            Arc::new(RequestStats::new()),
            CachePolicy::from_config(config),
        ))
    }
}

/// Ids arrive as path text; anything that is not an integer is a bad request.
fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| CatalogError::InvalidRequest(format!("Invalid product id: {raw}")))
}

fn validated(req: ProductRequest) -> Result<ProductFields> {
    if let Some(error_msg) = req.validate() {
        return Err(CatalogError::InvalidRequest(error_msg));
    }
    Ok(req.into_fields())
}

/// Handler for GET /api/products
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let filter = query.to_filter().ok_or_else(|| {
        CatalogError::InvalidRequest(format!("Page {} is out of range", query.page()))
    })?;
    let page = state.catalog.list(&filter).await?;
    Ok(Json(ProductListResponse::new(page)))
}

/// Handler for GET /api/products/categories
pub async fn categories_handler(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(CategoriesResponse::new(categories)))
}

/// Handler for GET /api/products/:id
///
/// Served through the cache; the response says whether it was a hit.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = parse_id(&raw_id)?;
    let fetched = state
        .catalog
        .fetch(id)
        .await?
        .ok_or(CatalogError::NotFound(id))?;

    let ttl = state.catalog.policy().ttl_seconds();
    Ok(Json(ProductResponse::new(fetched, ttl)))
}

/// Handler for POST /api/products
pub async fn create_handler(
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<MutationResponse>)> {
    let fields = validated(req)?;
    let product = state.catalog.create(fields).await?;
    Ok((StatusCode::CREATED, Json(MutationResponse::created(product))))
}

/// Handler for PUT /api/products/:id
pub async fn update_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<MutationResponse>> {
    let id = parse_id(&raw_id)?;
    let fields = validated(req)?;
    let product = state
        .catalog
        .update(id, fields)
        .await?
        .ok_or(CatalogError::NotFound(id))?;
    Ok(Json(MutationResponse::updated(product)))
}

/// Handler for DELETE /api/products/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MutationResponse>> {
    let id = parse_id(&raw_id)?;
    state
        .catalog
        .delete(id)
        .await?
        .ok_or(CatalogError::NotFound(id))?;
    Ok(Json(MutationResponse::deleted(id)))
}

/// Handler for GET /api/products/stats/cache
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let requests = state.catalog.request_stats();
    let cache = state.catalog.cache_stats().await?;
    Ok(Json(StatsResponse::new(requests, cache)))
}

/// Handler for POST /api/products/stats/cache/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.catalog.reset_stats();
    Json(MessageResponse::new("Cache statistics reset"))
}

/// Handler for POST /api/products/cache/invalidate
pub async fn invalidate_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let removed = state.catalog.invalidate_all().await?;
    Ok(Json(MessageResponse::new(format!(
        "Cache cleared, {removed} product entries removed"
    ))))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::DataSource;
    use crate::store::MemoryProductStore;

    fn state() -> AppState {
        AppState::with_backends(
            Arc::new(MemoryProductStore::new()),
            Arc::new(MemoryCache::new()),
            &Config::default(),
        )
    }

    fn request(name: &str) -> ProductRequest {
        ProductRequest {
            name: name.to_string(),
            description: Some("desc".to_string()),
            price: 10.0,
            category: "Books".to_string(),
            stock: 2,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_handler() {
        let state = state();

        let (status, created) = create_handler(State(state.clone()), Json(request("Novel")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let id = created.data.as_ref().unwrap().id;

        let first = get_handler(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(first.data.name, "Novel");
        assert_eq!(first.cache.source, DataSource::Store);

        let second = get_handler(State(state), Path(id.to_string())).await.unwrap();
        assert!(second.cache.hit);
        assert_eq!(second.cache.ttl, 600);
    }

    #[tokio::test]
    async fn test_get_nonexistent_product() {
        let result = get_handler(State(state()), Path("77".to_string())).await;
        assert!(matches!(result, Err(CatalogError::NotFound(77))));
    }

    #[tokio::test]
    async fn test_get_non_numeric_id() {
        let result = get_handler(State(state()), Path("abc".to_string())).await;
        assert!(matches!(result, Err(CatalogError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_update_handler() {
        let state = state();
        let (_, created) = create_handler(State(state.clone()), Json(request("Novel")))
            .await
            .unwrap();
        let id = created.data.as_ref().unwrap().id;

        let updated = update_handler(State(state), Path(id.to_string()), Json(request("Novella")))
            .await
            .unwrap();
        assert_eq!(updated.data.as_ref().unwrap().name, "Novella");
        assert!(updated.cache.as_ref().unwrap().invalidated);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = state();
        let (_, created) = create_handler(State(state.clone()), Json(request("Novel")))
            .await
            .unwrap();
        let id = created.data.as_ref().unwrap().id;

        assert!(delete_handler(State(state.clone()), Path(id.to_string()))
            .await
            .is_ok());
        let again = delete_handler(State(state), Path(id.to_string())).await;
        assert!(matches!(again, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_request() {
        let result = create_handler(State(state()), Json(request(" "))).await;
        assert!(matches!(result, Err(CatalogError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_and_reset_handlers() {
        let state = state();
        let _ = get_handler(State(state.clone()), Path("1".to_string())).await;

        let stats = stats_handler(State(state.clone())).await.unwrap();
        assert_eq!(stats.data.application.total_requests, 1);
        assert_eq!(stats.data.application.cache_misses, 1);

        reset_stats_handler(State(state.clone())).await;
        let stats = stats_handler(State(state)).await.unwrap();
        assert_eq!(stats.data.application.total_requests, 0);
        assert_eq!(stats.data.application.hit_rate, "0.00");
    }

    #[tokio::test]
    async fn test_list_handler_rejects_unaddressable_page() {
        let query = ListQuery {
            page: Some(usize::MAX),
            ..Default::default()
        };
        let result = list_handler(State(state()), Query(query)).await;
        assert!(matches!(result, Err(CatalogError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
