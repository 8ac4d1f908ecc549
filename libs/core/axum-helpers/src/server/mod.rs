//! Server infrastructure module.
//!
//! Router assembly with common middleware, the /health endpoint, and graceful
//! shutdown coordination.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, health_router};
//! use core_config::server::ServerConfig;
//!
//! let router = create_router(api_routes).await?;
//! let app = router.merge(health_router("kedai-api", env!("CARGO_PKG_VERSION")));
//! create_app(app, &ServerConfig::default()).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, create_production_app, create_router};
pub use health::{health_router, run_health_checks, HealthCheckFuture, HealthResponse};
pub use shutdown::{shutdown_signal, ShutdownCoordinator};
