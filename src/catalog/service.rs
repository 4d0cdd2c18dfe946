//! Catalog Service
//!
//! Cache-aside orchestration. Reads populate the cache lazily on a miss,
//! writes never populate it, and update/delete remove the cached snapshot
//! before reporting success.
//!
//! Two concurrent misses on the same id both read the store and both write
//! the cache (last write wins). There is no single-flight guard.
//!
//! A miss that read the store before an update or delete may finish its
//! cache write after that mutation cleared the key. Such a write is detected
//! through the invalidation generation and removed again, so no snapshot
//! older than a completed mutation survives it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheBackend, EngineStats};
use crate::catalog::generation::Generations;
use crate::catalog::{codec, CachePolicy, RequestStats, StatsSnapshot};
use crate::error::{CatalogError, Result};
use crate::models::{Product, ProductFields, ProductFilter};
use crate::store::ProductStore;

// == Provenance ==
/// Where a fetched product came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Cache,
    Store,
}

/// Outcome of the cache write that follows a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    /// Served from cache, nothing to write
    NotNeeded,
    /// Snapshot written with the configured TTL
    Stored,
    /// Write failed; the read still succeeded
    Failed,
    /// Written, then removed because the product was mutated meanwhile
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheProvenance {
    pub hit: bool,
    pub source: DataSource,
    pub population: Population,
}

impl CacheProvenance {
    fn hit() -> Self {
        Self {
            hit: true,
            source: DataSource::Cache,
            population: Population::NotNeeded,
        }
    }

    fn miss(population: Population) -> Self {
        Self {
            hit: false,
            source: DataSource::Store,
            population,
        }
    }
}

/// A product returned by [`CatalogService::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub product: Product,
    pub provenance: CacheProvenance,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

/// Cache occupancy and engine counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheSnapshot {
    /// Live product keys, counted when the snapshot was taken
    pub cached_products: u64,
    /// Live keys in the whole cache namespace
    pub total_keys: u64,
    /// The engine's own keyspace counters, if it keeps any
    pub engine: Option<EngineStats>,
}

// == Catalog Service ==
/// Mediates every single-product read and every mutation.
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn CacheBackend>,
    stats: Arc<RequestStats>,
    policy: CachePolicy,
    generations: Generations,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn CacheBackend>,
        stats: Arc<RequestStats>,
        policy: CachePolicy,
    ) -> Self {
        Self {
            store,
            cache,
            stats,
            policy,
            generations: Generations::new(),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // == Fetch ==
    /// Reads one product, preferring the cache.
    ///
    /// Cache read failures and undecodable snapshots are logged and treated
    /// as misses. A product absent from the store is never cached.
    pub async fn fetch(&self, id: i64) -> Result<Option<Fetched>> {
        self.stats.record_request();
        let key = self.policy.key_for(id);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => match codec::decode(&bytes) {
                Ok(product) => {
                    self.stats.record_hit();
                    debug!(id, "Cache hit");
                    return Ok(Some(Fetched {
                        product,
                        provenance: CacheProvenance::hit(),
                    }));
                }
                Err(err) => warn!(id, error = %err, "Ignoring undecodable cache entry"),
            },
            Ok(None) => {}
            Err(err) => warn!(id, error = %err, "Cache read failed, falling back to store"),
        }

        self.stats.record_miss();
        debug!(id, "Cache miss");

        let generation = self.generations.current(id);
        let Some(product) = self.store.find_by_id(id).await? else {
            debug!(id, "Product not in store, nothing cached");
            return Ok(None);
        };

        let population = self.populate(&key, &product, generation).await;
        Ok(Some(Fetched {
            product,
            provenance: CacheProvenance::miss(population),
        }))
    }

    async fn populate(&self, key: &str, product: &Product, generation: u64) -> Population {
        let bytes = match codec::encode(product) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(id = product.id, error = %err, "Could not encode product for cache");
                return Population::Failed;
            }
        };

        match self
            .cache
            .set_with_ttl(key, bytes, self.policy.ttl_seconds())
            .await
        {
            Ok(()) if self.generations.current(product.id) != generation => {
                self.discard(key, product.id).await
            }
            Ok(()) => {
                debug!(id = product.id, ttl = self.policy.ttl_seconds(), "Product cached");
                Population::Stored
            }
            Err(err) => {
                warn!(id = product.id, error = %err, "Cache write failed, serving store result");
                Population::Failed
            }
        }
    }

    /// Removes a snapshot whose store read may predate an invalidation.
    async fn discard(&self, key: &str, id: i64) -> Population {
        match self.cache.delete(key).await {
            Ok(_) => {
                debug!(id, "Product changed while caching, snapshot discarded");
                Population::Superseded
            }
            Err(err) => {
                error!(id, error = %err, "Could not discard superseded snapshot");
                Population::Failed
            }
        }
    }

    // == Mutations ==
    /// Creates a product. The cache is not touched.
    pub async fn create(&self, fields: ProductFields) -> Result<Product> {
        let product = self.store.create(fields).await?;
        info!(id = product.id, "Product created");
        Ok(product)
    }

    /// Replaces a product's fields, then clears its cached snapshot.
    ///
    /// Returns `None` when the product does not exist; nothing is mutated
    /// in that case.
    pub async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>> {
        let Some(product) = self.store.update(id, fields).await? else {
            return Ok(None);
        };
        self.invalidate(id).await?;
        info!(id, "Product updated");
        Ok(Some(product))
    }

    /// Removes a product, then clears its cached snapshot.
    pub async fn delete(&self, id: i64) -> Result<Option<Product>> {
        let Some(product) = self.store.delete(id).await? else {
            return Ok(None);
        };
        self.invalidate(id).await?;
        info!(id, "Product deleted");
        Ok(Some(product))
    }

    async fn invalidate(&self, id: i64) -> Result<()> {
        self.generations.bump(id);
        match self.cache.delete(&self.policy.key_for(id)).await {
            Ok(existed) => {
                debug!(id, existed, "Cache entry invalidated");
                Ok(())
            }
            Err(source) => {
                error!(id, error = %source, "Cache invalidation failed after store mutation");
                Err(CatalogError::InvalidationFailed { id, source })
            }
        }
    }

    // == Listing ==
    /// Lists products straight from the store.
    pub async fn list(&self, filter: &ProductFilter) -> Result<ProductPage> {
        let products = self.store.find_all(filter).await?;
        let total = self.store.count(filter).await?;

        let limit = filter.limit.max(1) as u64;
        Ok(ProductPage {
            products,
            total,
            page: filter.offset as u64 / limit + 1,
            limit,
            pages: total.div_ceil(limit),
        })
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(self.store.distinct_categories().await?)
    }

    // == Administration ==
    /// Removes every cached product snapshot. Returns how many were removed.
    pub async fn invalidate_all(&self) -> Result<u64> {
        let keys = self.cache.list_keys(&self.policy.pattern()).await?;
        if keys.is_empty() {
            debug!("No cached products to invalidate");
            return Ok(0);
        }

        let removed = self.cache.delete_many(&keys).await?;
        info!(removed, "Invalidated all cached products");
        Ok(removed)
    }

    pub async fn cache_stats(&self) -> Result<CacheSnapshot> {
        let cached_products = self.cache.list_keys(&self.policy.pattern()).await?.len() as u64;
        let total_keys = self.cache.count_all().await?;
        let engine = self.cache.engine_stats().await?;

        Ok(CacheSnapshot {
            cached_products,
            total_keys,
            engine,
        })
    }

    pub fn request_stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
        info!("Request statistics reset");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::cache::MemoryCache;
    use crate::error::{CacheError, StoreError};
    use crate::store::MemoryProductStore;

    /// Memory cache whose operations can be made to fail on demand.
    #[derive(Default)]
    struct FlakyCache {
        inner: MemoryCache,
        fail_get: AtomicBool,
        fail_set: AtomicBool,
        fail_delete: AtomicBool,
    }

    fn outage() -> CacheError {
        CacheError::Unavailable("connection refused".to_string())
    }

    #[async_trait]
    impl CacheBackend for FlakyCache {
        async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
            if self.fail_get.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.get(key).await
        }

        async fn set_with_ttl(
            &self,
            key: &str,
            value: Vec<u8>,
            ttl_seconds: u64,
        ) -> std::result::Result<(), CacheError> {
            if self.fail_set.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.set_with_ttl(key, value, ttl_seconds).await
        }

        async fn delete(&self, key: &str) -> std::result::Result<bool, CacheError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(outage());
            }
            self.inner.delete(key).await
        }

        async fn delete_many(&self, keys: &[String]) -> std::result::Result<u64, CacheError> {
            self.inner.delete_many(keys).await
        }

        async fn list_keys(&self, pattern: &str) -> std::result::Result<Vec<String>, CacheError> {
            self.inner.list_keys(pattern).await
        }

        async fn count_all(&self) -> std::result::Result<u64, CacheError> {
            self.inner.count_all().await
        }
    }

    /// Store that is always down.
    struct DownStore;

    #[async_trait]
    impl ProductStore for DownStore {
        async fn find_by_id(&self, _: i64) -> std::result::Result<Option<Product>, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn find_all(&self, _: &ProductFilter) -> std::result::Result<Vec<Product>, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn count(&self, _: &ProductFilter) -> std::result::Result<u64, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn create(&self, _: ProductFields) -> std::result::Result<Product, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn update(
            &self,
            _: i64,
            _: ProductFields,
        ) -> std::result::Result<Option<Product>, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn delete(&self, _: i64) -> std::result::Result<Option<Product>, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
        async fn distinct_categories(&self) -> std::result::Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("pool exhausted".to_string()))
        }
    }

    /// Memory store that can park the next `find_by_id` after it has read
    /// the row, until the test releases it.
    #[derive(Default)]
    struct GatedStore {
        inner: MemoryProductStore,
        armed: AtomicBool,
        parked: Notify,
        release: Notify,
    }

    impl GatedStore {
        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ProductStore for GatedStore {
        async fn find_by_id(&self, id: i64) -> std::result::Result<Option<Product>, StoreError> {
            let row = self.inner.find_by_id(id).await;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.parked.notify_one();
                self.release.notified().await;
            }
            row
        }
        async fn find_all(
            &self,
            filter: &ProductFilter,
        ) -> std::result::Result<Vec<Product>, StoreError> {
            self.inner.find_all(filter).await
        }
        async fn count(&self, filter: &ProductFilter) -> std::result::Result<u64, StoreError> {
            self.inner.count(filter).await
        }
        async fn create(&self, fields: ProductFields) -> std::result::Result<Product, StoreError> {
            self.inner.create(fields).await
        }
        async fn update(
            &self,
            id: i64,
            fields: ProductFields,
        ) -> std::result::Result<Option<Product>, StoreError> {
            self.inner.update(id, fields).await
        }
        async fn delete(&self, id: i64) -> std::result::Result<Option<Product>, StoreError> {
            self.inner.delete(id).await
        }
        async fn distinct_categories(&self) -> std::result::Result<Vec<String>, StoreError> {
            self.inner.distinct_categories().await
        }
    }

    fn gated_service() -> (Arc<CatalogService>, Arc<GatedStore>, Arc<MemoryCache>) {
        let store = Arc::new(GatedStore::default());
        let cache = Arc::new(MemoryCache::new());
        let service = CatalogService::new(
            store.clone(),
            cache.clone(),
            Arc::new(RequestStats::new()),
            CachePolicy::new("product:", 600),
        );
        (Arc::new(service), store, cache)
    }

    /// Starts a fetch that reads the store and then waits for `release`.
    async fn parked_fetch(
        service: &Arc<CatalogService>,
        store: &GatedStore,
        id: i64,
    ) -> tokio::task::JoinHandle<Result<Option<Fetched>>> {
        store.arm();
        let handle = tokio::spawn({
            let service = service.clone();
            async move { service.fetch(id).await }
        });
        store.parked.notified().await;
        handle
    }

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: None,
            price,
            category: "Electronics".to_string(),
            stock: 5,
            image_url: None,
        }
    }

    fn service_with(
        cache: Arc<dyn CacheBackend>,
        ttl: u64,
    ) -> (CatalogService, Arc<MemoryProductStore>) {
        let store = Arc::new(MemoryProductStore::new());
        let service = CatalogService::new(
            store.clone(),
            cache,
            Arc::new(RequestStats::new()),
            CachePolicy::new("product:", ttl),
        );
        (service, store)
    }

    fn service() -> (CatalogService, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let (service, _) = service_with(cache.clone(), 600);
        (service, cache)
    }

    #[tokio::test]
    async fn test_miss_populates_then_hits() {
        let (service, cache) = service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        let first = service.fetch(created.id).await.unwrap().unwrap();
        assert!(!first.provenance.hit);
        assert_eq!(first.provenance.source, DataSource::Store);
        assert_eq!(first.provenance.population, Population::Stored);
        assert_eq!(first.product, created);

        let second = service.fetch(created.id).await.unwrap().unwrap();
        assert!(second.provenance.hit);
        assert_eq!(second.provenance.source, DataSource::Cache);
        assert_eq!(second.product, created);

        assert_eq!(cache.list_keys("product:*").await.unwrap(), vec!["product:1"]);
        let stats = service.request_stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_create_does_not_write_cache() {
        let (service, cache) = service();
        service.create(fields("Monitor", 199.0)).await.unwrap();
        assert_eq!(cache.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (service, cache) = service();

        assert!(service.fetch(404).await.unwrap().is_none());
        assert_eq!(cache.count_all().await.unwrap(), 0);

        let stats = service.request_stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_update_invalidates() {
        let (service, cache) = service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(created.id).await.unwrap();

        let updated = service
            .update(created.id, fields("Monitor 4K", 349.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cache.count_all().await.unwrap(), 0);

        let fetched = service.fetch(created.id).await.unwrap().unwrap();
        assert!(!fetched.provenance.hit);
        assert_eq!(fetched.product, updated);
        assert_eq!(fetched.product.name, "Monitor 4K");
    }

    #[tokio::test]
    async fn test_update_missing_leaves_cache_alone() {
        let (service, cache) = service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(created.id).await.unwrap();

        assert!(service.update(99, fields("Ghost", 1.0)).await.unwrap().is_none());
        assert_eq!(cache.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_invalidates() {
        let (service, cache) = service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(created.id).await.unwrap();

        let deleted = service.delete(created.id).await.unwrap();
        assert_eq!(deleted, Some(created.clone()));
        assert_eq!(cache.count_all().await.unwrap(), 0);
        assert!(service.fetch(created.id).await.unwrap().is_none());
        assert!(service.delete(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry_forces_miss() {
        let cache = Arc::new(MemoryCache::new());
        let (service, _) = service_with(cache.clone(), 1);
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        service.fetch(created.id).await.unwrap();
        assert!(service.fetch(created.id).await.unwrap().unwrap().provenance.hit);

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(cache.list_keys("product:*").await.unwrap().len(), 0);
        let after = service.fetch(created.id).await.unwrap().unwrap();
        assert!(!after.provenance.hit);
        assert_eq!(after.provenance.source, DataSource::Store);
    }

    #[tokio::test]
    async fn test_invalidate_all_twice() {
        let (service, cache) = service();
        for name in ["A", "B", "C"] {
            let p = service.create(fields(name, 1.0)).await.unwrap();
            service.fetch(p.id).await.unwrap();
        }
        cache.set_with_ttl("session:x", b"keep".to_vec(), 60).await.unwrap();

        assert_eq!(service.invalidate_all().await.unwrap(), 3);
        assert_eq!(service.invalidate_all().await.unwrap(), 0);
        // Keys outside the product namespace survive
        assert_eq!(cache.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let (service, cache) = service();
        let p = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(p.id).await.unwrap();
        service.fetch(p.id).await.unwrap();
        cache.set_with_ttl("session:x", b"s".to_vec(), 60).await.unwrap();

        let snapshot = service.cache_stats().await.unwrap();
        assert_eq!(snapshot.cached_products, 1);
        assert_eq!(snapshot.total_keys, 2);
        let engine = snapshot.engine.unwrap();
        assert_eq!(engine.hits, 1);
        assert_eq!(engine.misses, 1);
    }

    #[tokio::test]
    async fn test_reset_stats() {
        let (service, _) = service();
        service.fetch(1).await.unwrap();
        service.reset_stats();

        let stats = service.request_stats();
        assert_eq!(stats, StatsSnapshot::default());
        assert_eq!(stats.hit_rate_display(), "0.00");
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_back_to_store() {
        let cache = Arc::new(FlakyCache::default());
        let (service, _) = service_with(cache.clone(), 600);
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(created.id).await.unwrap();

        cache.fail_get.store(true, Ordering::SeqCst);
        let fetched = service.fetch(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.product, created);
        assert_eq!(fetched.provenance.source, DataSource::Store);
        assert_eq!(service.request_stats().cache_misses, 2);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_returns_product() {
        let cache = Arc::new(FlakyCache::default());
        let (service, _) = service_with(cache.clone(), 600);
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        cache.fail_set.store(true, Ordering::SeqCst);
        let fetched = service.fetch(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.product, created);
        assert_eq!(fetched.provenance.population, Population::Failed);
        assert_eq!(cache.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let cache = Arc::new(MemoryCache::new());
        let (service, _) = service_with(cache.clone(), 600);
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        cache.set_with_ttl("product:1", b"{broken".to_vec(), 600).await.unwrap();

        let fetched = service.fetch(created.id).await.unwrap().unwrap();
        assert!(!fetched.provenance.hit);
        assert_eq!(fetched.provenance.population, Population::Stored);

        // Repaired by the repopulation
        assert!(service.fetch(created.id).await.unwrap().unwrap().provenance.hit);
    }

    #[tokio::test]
    async fn test_invalidation_failure_is_reported() {
        let cache = Arc::new(FlakyCache::default());
        let (service, store) = service_with(cache.clone(), 600);
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();
        service.fetch(created.id).await.unwrap();

        cache.fail_delete.store(true, Ordering::SeqCst);
        let result = service.update(created.id, fields("Monitor 4K", 349.0)).await;
        assert!(matches!(
            result,
            Err(CatalogError::InvalidationFailed { id, .. }) if id == created.id
        ));
        // The store mutation itself went through
        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Monitor 4K");

        let result = service.delete(created.id).await;
        assert!(matches!(result, Err(CatalogError::InvalidationFailed { .. })));
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = CatalogService::new(
            Arc::new(DownStore),
            Arc::new(MemoryCache::new()),
            Arc::new(RequestStats::new()),
            CachePolicy::default(),
        );

        assert!(matches!(service.fetch(1).await, Err(CatalogError::Store(_))));
        assert!(matches!(
            service.create(fields("X", 1.0)).await,
            Err(CatalogError::Store(_))
        ));
        assert!(matches!(
            service.list(&ProductFilter::default()).await,
            Err(CatalogError::Store(_))
        ));
        // The fetch attempt was still counted
        assert_eq!(service.request_stats().total_requests, 1);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (service, cache) = service();
        for i in 0..7 {
            service.create(fields(&format!("Item {i}"), 1.0)).await.unwrap();
        }

        let filter = ProductFilter {
            limit: 3,
            offset: 3,
            ..Default::default()
        };
        let page = service.list(&filter).await.unwrap();
        assert_eq!(page.products.len(), 3);
        assert_eq!(page.total, 7);
        assert_eq!(page.page, 2);
        assert_eq!(page.pages, 3);

        // Listing neither caches nor counts
        assert_eq!(cache.count_all().await.unwrap(), 0);
        assert_eq!(service.request_stats().total_requests, 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_leave_one_entry() {
        let (service, cache) = service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        let (a, b) = tokio::join!(service.fetch(created.id), service.fetch(created.id));
        assert_eq!(a.unwrap().unwrap().product, created);
        assert_eq!(b.unwrap().unwrap().product, created);

        assert_eq!(cache.list_keys("product:*").await.unwrap(), vec!["product:1"]);
        let cached = cache.get("product:1").await.unwrap().unwrap();
        assert_eq!(codec::decode(&cached).unwrap(), created);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_fetches_lose_no_counts() {
        let (service, _) = service();
        let service = Arc::new(service);
        for i in 0..5 {
            service.create(fields(&format!("Item {i}"), 1.0)).await.unwrap();
        }

        let handles: Vec<_> = (0..16)
            .map(|task| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    for round in 0..25 {
                        let id = ((task + round) % 6) as i64 + 1;
                        service.fetch(id).await.unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = service.request_stats();
        assert_eq!(stats.total_requests, 400);
        assert_eq!(stats.cache_hits + stats.cache_misses, 400);
    }

    #[tokio::test]
    async fn test_fetch_in_flight_during_delete_leaves_no_snapshot() {
        let (service, store, cache) = gated_service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        let slow = parked_fetch(&service, &store, created.id).await;
        assert!(service.delete(created.id).await.unwrap().is_some());
        store.release.notify_one();

        // The slow reader still answers with what it read
        let stale = slow.await.unwrap().unwrap().unwrap();
        assert_eq!(stale.product, created);
        assert_eq!(stale.provenance.population, Population::Superseded);

        assert_eq!(cache.count_all().await.unwrap(), 0);
        assert!(service.fetch(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_in_flight_during_update_leaves_no_snapshot() {
        let (service, store, cache) = gated_service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        let slow = parked_fetch(&service, &store, created.id).await;
        let updated = service
            .update(created.id, fields("Monitor 4K", 349.0))
            .await
            .unwrap()
            .unwrap();
        store.release.notify_one();

        let stale = slow.await.unwrap().unwrap().unwrap();
        assert_eq!(stale.product.price, 199.0);
        assert_eq!(stale.provenance.population, Population::Superseded);
        assert_eq!(cache.count_all().await.unwrap(), 0);

        let fresh = service.fetch(created.id).await.unwrap().unwrap();
        assert!(!fresh.provenance.hit);
        assert_eq!(fresh.product, updated);
        assert_eq!(fresh.provenance.population, Population::Stored);
        assert!(service.fetch(created.id).await.unwrap().unwrap().provenance.hit);
    }

    #[tokio::test]
    async fn test_fetch_without_intervening_mutation_keeps_snapshot() {
        let (service, store, cache) = gated_service();
        let created = service.create(fields("Monitor", 199.0)).await.unwrap();

        let slow = parked_fetch(&service, &store, created.id).await;
        store.release.notify_one();

        let fetched = slow.await.unwrap().unwrap().unwrap();
        assert_eq!(fetched.provenance.population, Population::Stored);
        assert_eq!(cache.count_all().await.unwrap(), 1);
    }
}
