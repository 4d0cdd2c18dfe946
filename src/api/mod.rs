//! API Module
//!
//! HTTP handlers and routing for the product catalog REST API.
//!
//! # Endpoints
//! - `GET /api/products` - List products (search, category, page, limit)
//! - `POST /api/products` - Create a product
//! - `GET /api/products/:id` - Fetch a product through the cache
//! - `PUT /api/products/:id` - Replace a product and invalidate its cache entry
//! - `DELETE /api/products/:id` - Delete a product and invalidate its cache entry
//! - `GET /api/products/categories` - Distinct categories
//! - `GET /api/products/stats/cache` - Request and cache statistics
//! - `POST /api/products/stats/cache/reset` - Reset request statistics
//! - `POST /api/products/cache/invalidate` - Drop every cached product
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
