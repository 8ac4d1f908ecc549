//! # Axum Helpers
//!
//! Shared HTTP-layer utilities for the kedai API:
//!
//! - **[`auth`]**: JWT authentication with a Redis-backed revocation blacklist
//! - **[`cache`]**: read-through response cache with pattern invalidation
//! - **[`errors`]**: the `{success:false, message, error?}` error body
//! - **[`extractors`]**: validated JSON extractor
//! - **[`response`]**: success envelope, pagination meta, page links
//! - **[`server`]**: router assembly, health endpoint, graceful shutdown

pub mod auth;
pub mod cache;
pub mod errors;
pub mod extractors;
pub mod response;
pub mod server;

pub use auth::{auth_middleware, AuthUser, BearerToken, Claims, JwtAuth, RevocationError};
pub use cache::{cache_middleware, ResponseCache};
pub use errors::{error_response, internal_error, not_found, ErrorBody};
pub use extractors::ValidatedJson;
pub use response::{ApiBody, ListMeta, PageLinks, Pagination};
pub use server::{create_app, create_production_app, create_router, health_router, shutdown_signal};
