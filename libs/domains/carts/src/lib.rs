//! Shopping carts: one row per user/product/size/variant pick, with the line
//! subtotal computed from catalog pricing at add time.

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CartError, CartResult};
pub use models::{AddCartRequest, Cart, CartResponse};
pub use postgres::PgCartRepository;
pub use repository::{CartRepository, InMemoryCartRepository};
pub use service::CartService;
