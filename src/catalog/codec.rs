//! Snapshot encoding at the cache boundary.
//!
//! Cached products are stored as a versioned JSON document with a fixed set
//! of named fields and RFC 3339 timestamps. Anything that does not decode to
//! the current version is reported as an error so the caller can treat it as
//! a miss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::models::Product;

/// Current snapshot layout version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    #[serde(rename = "v")]
    version: u32,
    id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    category: String,
    stock: u32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Encodes a product into cache bytes.
pub fn encode(product: &Product) -> Result<Vec<u8>, CodecError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        id: product.id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        category: product.category.clone(),
        stock: product.stock,
        image_url: product.image_url.clone(),
        created_at: product.created_at,
        updated_at: product.updated_at,
    };
    serde_json::to_vec(&snapshot).map_err(CodecError::Encode)
}

/// Decodes cache bytes back into a product.
pub fn decode(bytes: &[u8]) -> Result<Product, CodecError> {
    let snapshot: Snapshot = serde_json::from_slice(bytes).map_err(CodecError::Decode)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(CodecError::UnsupportedVersion(snapshot.version));
    }

    Ok(Product {
        id: snapshot.id,
        name: snapshot.name,
        description: snapshot.description,
        price: snapshot.price,
        category: snapshot.category,
        stock: snapshot.stock,
        image_url: snapshot.image_url,
        created_at: snapshot.created_at,
        updated_at: snapshot.updated_at,
    })
}
