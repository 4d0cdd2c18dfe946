//! Product catalog domain types shared by the store, the cache and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size when a filter does not ask for one
pub const DEFAULT_FILTER_LIMIT: usize = 50;

// == Product ==
/// A catalog record as held by the durable store.
///
/// `id` and `created_at` never change once assigned; `updated_at` is
/// refreshed by the store on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a fresh record from its mutable fields.
    pub fn new(id: i64, fields: ProductFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            category: fields.category,
            stock: fields.stock,
            image_url: fields.image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field at once and stamps `updated_at`.
    pub fn apply(&mut self, fields: ProductFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.description = fields.description;
        self.price = fields.price;
        self.category = fields.category;
        self.stock = fields.stock;
        self.image_url = fields.image_url;
        self.updated_at = now;
    }
}

// == Product Fields ==
/// The replaceable part of a product, used for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

// == Product Filter ==
/// Listing filter: case-insensitive name search, exact category, and a page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            limit: DEFAULT_FILTER_LIMIT,
            offset: 0,
        }
    }
}

impl ProductFilter {
    /// Whether `product` passes the search and category parts of the filter.
    pub fn matches(&self, product: &Product) -> bool {
        let search_ok = match self.search.as_deref() {
            Some(needle) if !needle.is_empty() => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        let category_ok = match self.category.as_deref() {
            Some(category) if !category.is_empty() => product.category == category,
            _ => true,
        };
        search_ok && category_ok
    }
}
