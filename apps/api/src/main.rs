//! Kedai API - REST backend for the kedai storefront

use std::time::Duration;

use axum_helpers::server::{create_production_app, create_router, health_router};
use axum_helpers::{JwtAuth, ResponseCache};
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::{info, warn};

mod config;
mod contacts;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to Postgres");
    let db = database::postgres::connect_with_retry(&config.database, None).await?;
    database::postgres::run_migrations::<migration::Migrator>(&db, env!("CARGO_PKG_NAME")).await?;

    info!("Connecting to Redis");
    let redis = database::redis::connect_with_retry(&config.redis, None).await?;

    let jwt = JwtAuth::new(redis.clone(), &config.auth);
    let cache = ResponseCache::new(redis.clone());

    let state = AppState {
        config,
        db,
        redis,
        jwt,
        cache,
    };

    let apis = routes::api_router(&state);
    let app = create_router(apis)
        .await?
        .merge(health_router(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
        .merge(routes::readiness_router(
            state.db.clone(),
            state.redis.clone(),
        ));

    let cleanup_db = state.db.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Closing database connection");
            if let Err(e) = cleanup_db.close().await {
                warn!("Failed to close database connection: {}", e);
            }
        },
    )
    .await?;

    Ok(())
}
