//! Product Cache - a product catalog API with a cache-aside layer
//!
//! Single-product reads go through a TTL cache that is populated lazily on a
//! miss; updates and deletes clear the cached snapshot before they return.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use catalog::CatalogService;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
