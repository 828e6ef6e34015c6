//! Catalog domain adapters
//!
//! Thin, configuration-driven adapters over the stored-procedure client.

pub mod brands;
pub mod products;
pub mod resource;

pub use brands::{Brand, BrandFilter, BrandInput, BrandService};
pub use products::{Product, ProductFilter, ProductInput, ProductService};
pub use resource::{ResourceAdapter, ResourceEndpoints};
