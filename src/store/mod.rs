//! Durable Store Module
//!
//! The authoritative side of the cache-aside pair. `ProductStore` is the
//! contract the catalog relies on; `MemoryProductStore` is the bundled
//! implementation.

mod memory;
mod seed;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Product, ProductFields, ProductFilter};

pub use memory::MemoryProductStore;
pub use seed::demo_catalog;

// == Product Store ==
/// Persistence operations on product records, keyed by store-assigned id.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Matching products, newest first, windowed by the filter's limit/offset.
    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Number of matching products, ignoring limit/offset.
    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError>;

    async fn create(&self, fields: ProductFields) -> Result<Product, StoreError>;

    /// Replaces all mutable fields. `None` if no such product exists.
    async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>, StoreError>;

    /// Removes the product and returns it. `None` if no such product exists.
    async fn delete(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Sorted distinct categories across all products.
    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError>;
}
