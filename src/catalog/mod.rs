//! Catalog Module
//!
//! Cache-aside orchestration over the product store: single-product reads go
//! through the cache, mutations go to the store and then clear the cached
//! snapshot, and every read is counted.

pub mod codec;
mod generation;
mod policy;
mod service;
mod stats;


pub use policy::CachePolicy;
pub use service::{
    CacheProvenance, CacheSnapshot, CatalogService, DataSource, Fetched, Population, ProductPage,
};
pub use stats::{RequestStats, StatsSnapshot};
