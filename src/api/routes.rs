//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    categories_handler, create_handler, delete_handler, get_handler, health_handler,
    invalidate_handler, list_handler, reset_stats_handler, stats_handler, update_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/products", get(list_handler).post(create_handler))
        .route("/api/products/categories", get(categories_handler))
        .route("/api/products/stats/cache", get(stats_handler))
        .route("/api/products/stats/cache/reset", post(reset_stats_handler))
        .route("/api/products/cache/invalidate", post(invalidate_handler))
        .route(
            "/api/products/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
