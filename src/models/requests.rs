//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::models::{ProductFields, ProductFilter};

/// Page size used when the query does not specify one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a caller may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Request body for create (POST /api/products) and update (PUT /api/products/:id)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Some("Category is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Some("Price must be a non-negative number".to_string());
        }
        None
    }

    /// Trims text fields and turns blank optional fields into `None`.
    pub fn into_fields(self) -> ProductFields {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        ProductFields {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            price: self.price,
            category: self.category.trim().to_string(),
            stock: self.stock,
            image_url: non_blank(self.image_url),
        }
    }
}

/// Query string for GET /api/products
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListQuery {
    /// 1-based page number
    pub fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    pub fn limit(&self) -> usize {
        self.limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE)
    }

    /// Builds the store filter for this query.
    ///
    /// Returns `None` when the requested page lies past the addressable
    /// offset range.
    pub fn to_filter(&self) -> Option<ProductFilter> {
        let limit = self.limit();
        let offset = (self.page() - 1).checked_mul(limit)?;
        Some(ProductFilter {
            search: self.search.clone().filter(|s| !s.is_empty()),
            category: self.category.clone().filter(|c| !c.is_empty()),
            limit,
            offset,
        })
    }
}
