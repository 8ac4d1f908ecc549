//! Shared test utilities for domain testing
//!
//! Reusable containerized infrastructure for integration tests:
//! - `TestDatabase`: PostgreSQL container with automatic cleanup (feature: "postgres")
//! - `TestRedis`: Redis container with automatic cleanup (feature: "redis")
//!
//! Tests using either helper need Docker and are marked `#[ignore]` in the
//! crates that use them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::TestDatabase;
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::migrated::<migration::Migrator>().await;
//!     let repo = PgProductRepository::new(db.connection());
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;
