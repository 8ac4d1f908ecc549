//! Route composition for the kedai API.
//!
//! Three layers of surface:
//! - public: auth, product browsing, and the lookup tables
//! - authenticated: everything user-scoped, behind the JWT middleware
//! - admin: management CRUD under /admin, behind the same JWT middleware
//!
//! GET responses for products, histories, and admin transactions pass through
//! the Redis response cache; the write handlers invalidate the matching key
//! patterns themselves.

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use axum_helpers::{
    auth_middleware, cache_middleware,
    server::{run_health_checks, HealthCheckFuture},
};
use domain_carts::{handlers::carts_router, CartService, PgCartRepository};
use domain_catalog::{
    handlers::{
        admin_categories_router, admin_products_router, admin_sizes_router, admin_variants_router,
        categories_router, products_router, AdminCatalogState,
    },
    CatalogService, PgCatalogRepository,
};
use domain_orders::{
    handlers::{
        admin_transactions_router, checkout_router, histories_router, order_methods_router,
        payment_methods_router, OrderState,
    },
    OrderService, PgOrderRepository,
};
use domain_users::{
    handlers::{admin_router, auth_router, logout_router, profile_router},
    PgUserRepository, UserService,
};
use email::{Mailer, NoopMailer, SmtpConfig, SmtpMailer};
use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::contacts::ProfileContacts;
use crate::state::AppState;

/// Builds the full /api surface from the shared state.
pub fn api_router(state: &AppState) -> Router {
    let db = state.db.clone();
    let jwt = state.jwt.clone();
    let cache = state.cache.clone();

    let users = Arc::new(UserService::new(
        PgUserRepository::new(db.clone()),
        build_mailer(),
        state.config.reset_base_url.clone(),
    ));
    let catalog = Arc::new(CatalogService::new(PgCatalogRepository::new(db.clone())));
    let carts = Arc::new(CartService::new(
        Arc::new(PgCartRepository::new(db.clone())),
        Arc::new(PgCatalogRepository::new(db.clone())),
    ));
    let orders = Arc::new(OrderService::new(
        Arc::new(PgOrderRepository::new(db)),
        Arc::new(ProfileContacts::new(Arc::clone(&users))),
    ));

    let auth_layer = middleware::from_fn_with_state(jwt.clone(), auth_middleware);
    let cache_layer = middleware::from_fn_with_state(cache.clone(), cache_middleware);

    let order_state = OrderState {
        service: Arc::clone(&orders),
        cache: Some(cache.clone()),
    };
    let catalog_state = AdminCatalogState {
        service: Arc::clone(&catalog),
        cache: Some(cache),
    };

    let public = Router::new()
        .nest("/auth", auth_router(Arc::clone(&users), jwt.clone()))
        .nest(
            "/products",
            products_router(Arc::clone(&catalog)).layer(cache_layer.clone()),
        )
        .nest("/categories", categories_router(Arc::clone(&catalog)))
        .nest("/order-methods", order_methods_router(Arc::clone(&orders)))
        .nest(
            "/payment-methods",
            payment_methods_router(Arc::clone(&orders)),
        );

    let authenticated = Router::new()
        .nest("/auth", logout_router(Arc::clone(&users), jwt))
        .nest("/profile", profile_router(Arc::clone(&users)))
        .nest("/carts", carts_router(carts))
        .nest("/checkout", checkout_router(order_state.clone()))
        .nest(
            "/histories",
            histories_router(orders).layer(cache_layer.clone()),
        )
        .layer(auth_layer.clone());

    let admin = Router::new()
        .nest("/users", admin_router(users))
        .nest(
            "/products",
            admin_products_router(catalog_state.clone()).layer(cache_layer.clone()),
        )
        .nest("/categories", admin_categories_router(catalog_state.clone()))
        .nest("/sizes", admin_sizes_router(catalog_state.clone()))
        .nest("/variants", admin_variants_router(catalog_state))
        .nest(
            "/transactions",
            admin_transactions_router(order_state).layer(cache_layer),
        )
        .layer(auth_layer);

    public.merge(authenticated).nest("/admin", admin)
}

/// Readiness probe checking both backing stores.
pub fn readiness_router(db: DatabaseConnection, redis: ConnectionManager) -> Router {
    Router::new().route(
        "/ready",
        get(move || {
            let db = db.clone();
            let redis = redis.clone();
            async move {
                let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
                    (
                        "postgres",
                        Box::pin(async {
                            database::postgres::health_check(&db)
                                .await
                                .map_err(|e| e.to_string())
                        }),
                    ),
                    (
                        "redis",
                        Box::pin(async {
                            database::redis::health_check(&redis)
                                .await
                                .map_err(|e| e.to_string())
                        }),
                    ),
                ];
                run_health_checks(checks).await
            }
        }),
    )
}

/// SMTP when configured, otherwise a mailer that logs and drops.
fn build_mailer() -> Arc<dyn Mailer> {
    match SmtpConfig::from_env() {
        Some(config) => match SmtpMailer::new(config) {
            Ok(mailer) => {
                info!("Password reset emails will be sent via SMTP");
                Arc::new(mailer)
            }
            Err(e) => {
                warn!("SMTP misconfigured, falling back to noop mailer: {}", e);
                Arc::new(NoopMailer)
            }
        },
        None => {
            info!("SMTP not configured, password reset emails will be logged only");
            Arc::new(NoopMailer)
        }
    }
}
