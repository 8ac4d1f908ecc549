//! Shared application state

use axum_helpers::{JwtAuth, ResponseCache};
use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Handles built once at startup and shared across the routers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub redis: ConnectionManager,
    pub jwt: JwtAuth,
    pub cache: ResponseCache,
}
