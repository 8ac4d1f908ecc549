//! Product catalog: products with images and categories, plus the size and
//! variant add-ons that affect cart pricing.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use models::{Category, Product, ProductDetail, ProductImage, Size, Variant};
pub use postgres::PgCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::CatalogService;
