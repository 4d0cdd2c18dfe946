//! In-memory product store.
//!
//! Ids are assigned from 1 upwards and never reused. Product names are
//! unique, mirroring the unique index of the relational schema.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Product, ProductFields, ProductFilter};
use crate::store::ProductStore;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Product>,
    next_id: i64,
}

/// Product records held in process memory.
#[derive(Debug)]
pub struct MemoryProductStore {
    table: RwLock<Table>,
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every product in `items`, returning how many were created.
    pub async fn seed(&self, items: Vec<ProductFields>) -> Result<usize, StoreError> {
        let mut created = 0;
        for fields in items {
            self.create(fields).await?;
            created += 1;
        }
        Ok(created)
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }
}

impl Table {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    /// Matching rows ordered newest first
    fn matching<'a>(&'a self, filter: &'a ProductFilter) -> Vec<&'a Product> {
        let mut rows: Vec<&Product> = self.rows.values().filter(|p| filter.matches(p)).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .matching(filter)
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<u64, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn create(&self, fields: ProductFields) -> Result<Product, StoreError> {
        let mut table = self.table.write().await;
        if table.name_taken(&fields.name, None) {
            return Err(StoreError::Constraint(format!(
                "product name '{}' already exists",
                fields.name
            )));
        }

        let id = table.next_id;
        table.next_id += 1;
        let product = Product::new(id, fields, Utc::now());
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, fields: ProductFields) -> Result<Option<Product>, StoreError> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.name_taken(&fields.name, Some(id)) {
            return Err(StoreError::Constraint(format!(
                "product name '{}' already exists",
                fields.name
            )));
        }

        Ok(table.rows.get_mut(&id).map(|product| {
            product.apply(fields, Utc::now());
            product.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.table.write().await.rows.remove(&id))
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().await;
        let categories: BTreeSet<&str> = table.rows.values().map(|p| p.category.as_str()).collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }
}
