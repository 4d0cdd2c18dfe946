//! Demo catalog used when the server starts with `SEED_DEMO_DATA` set.

use crate::models::ProductFields;

fn item(name: &str, description: &str, price: f64, category: &str, stock: u32) -> ProductFields {
    ProductFields {
        name: name.to_string(),
        description: Some(description.to_string()),
        price,
        category: category.to_string(),
        stock,
        image_url: None,
    }
}

/// A small mixed-category catalog.
pub fn demo_catalog() -> Vec<ProductFields> {
    vec![
        item("Laptop Pro 15", "15-inch laptop with 32 GB RAM", 1899.0, "Electronics", 12),
        item("Wireless Mouse", "Ergonomic 2.4 GHz mouse", 29.9, "Electronics", 140),
        item("Mechanical Keyboard", "Tenkeyless, brown switches", 119.0, "Electronics", 35),
        item("Standing Desk", "Electric height-adjustable desk", 549.0, "Furniture", 8),
        item("Office Chair", "Mesh back with lumbar support", 289.0, "Furniture", 20),
        item("Espresso Machine", "15 bar pump, milk frother", 349.0, "Kitchen", 15),
        item("Chef Knife", "20 cm stainless steel", 79.5, "Kitchen", 60),
        item("Running Shoes", "Lightweight road running shoe", 129.0, "Sports", 44),
    ]
}
