use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use axum_helpers::{ApiBody, AuthUser, ValidatedJson};
use std::sync::Arc;

use domain_catalog::repository::CatalogRepository;

use crate::error::CartResult;
use crate::models::{AddCartRequest, CartResponse};
use crate::repository::CartRepository;
use crate::service::CartService;

/// Authenticated cart endpoints
pub fn carts_router<R, K>(service: Arc<CartService<R, K>>) -> Router
where
    R: CartRepository + 'static,
    K: CatalogRepository + 'static,
{
    Router::new()
        .route("/", get(list_carts).post(add_to_cart))
        .route("/{id}", axum::routing::delete(delete_cart))
        .with_state(service)
}

/// GET /carts
async fn list_carts<R, K>(
    State(service): State<Arc<CartService<R, K>>>,
    Extension(auth): Extension<AuthUser>,
) -> CartResult<Json<ApiBody<Vec<CartResponse>>>>
where
    R: CartRepository,
    K: CatalogRepository,
{
    let carts = service.list_carts(auth.id).await?;
    Ok(Json(ApiBody::new("Carts retrieved successfully", carts)))
}

/// POST /carts
async fn add_to_cart<R, K>(
    State(service): State<Arc<CartService<R, K>>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<AddCartRequest>,
) -> CartResult<impl IntoResponse>
where
    R: CartRepository,
    K: CatalogRepository,
{
    let cart = service.add_to_cart(auth.id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("Cart added successfully", cart)),
    ))
}

/// DELETE /carts/{id}
async fn delete_cart<R, K>(
    State(service): State<Arc<CartService<R, K>>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> CartResult<Json<ApiBody<()>>>
where
    R: CartRepository,
    K: CatalogRepository,
{
    service.delete_cart(auth.id, id).await?;
    Ok(Json(ApiBody::<()>::message_only("Cart deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCartRepository;
    use axum::body::Body;
    use axum::http::Request;
    use domain_catalog::models::NewProduct;
    use domain_catalog::InMemoryCatalogRepository;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn app_with_product() -> (Router, i32) {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        let created = catalog
            .create_product(NewProduct {
                name: "Kopi".to_string(),
                description: None,
                price: 20000.0,
                stock: 10,
                is_flash_sale: false,
                discount_percent: None,
                created_by: None,
                image_urls: vec![],
                category_ids: vec![],
            })
            .await
            .unwrap();

        let service = Arc::new(CartService::new(
            Arc::new(InMemoryCartRepository::new()),
            catalog,
        ));
        // Simulates the auth middleware having populated the user extension
        let router = carts_router(service).layer(Extension(AuthUser {
            id: 1,
            role: "user".to_string(),
        }));
        (router, created.product.id)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let (app, product_id) = app_with_product().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"productId":{},"amount":2}}"#,
                        product_id
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["data"]["subtotal"], 40000.0);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["productName"], "Kopi");
    }

    #[tokio::test]
    async fn test_add_rejects_zero_amount() {
        let (app, product_id) = app_with_product().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(
                        r#"{{"productId":{},"amount":0}}"#,
                        product_id
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_cart_404() {
        let (app, _) = app_with_product().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
