//! Domain types and the DTOs used for HTTP request/response bodies.

pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::{Product, ProductFields, ProductFilter};
pub use requests::{ListQuery, ProductRequest};
pub use responses::{
    CategoriesResponse, HealthResponse, MessageResponse, MutationResponse, ProductListResponse,
    ProductResponse, StatsResponse,
};
