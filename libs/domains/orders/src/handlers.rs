use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_helpers::{ApiBody, AuthUser, ListMeta, Pagination, ResponseCache, ValidatedJson};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::LazyLock;

use crate::error::{OrderError, OrderResult};
use crate::models::{
    AdminTransactionFilter, CheckoutRequest, HistoryFilter, OrderMethod, PaymentMethod,
    TransactionDetailResponse, TransactionSummary, UpdateStatusRequest,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

const HISTORY_PAGE_SIZE: u64 = 5;
const MAX_HISTORY_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

static DATE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Order handlers carry the cache handle so writes can invalidate cached
/// listing pages. `None` disables invalidation (tests).
pub struct OrderState<R: OrderRepository> {
    pub service: Arc<OrderService<R>>,
    pub cache: Option<ResponseCache>,
}

impl<R: OrderRepository> Clone for OrderState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: self.cache.clone(),
        }
    }
}

impl<R: OrderRepository> OrderState<R> {
    async fn invalidate_listings(&self) {
        if let Some(ref cache) = self.cache {
            cache.invalidate("/api/admin/transactions*").await;
            cache.invalidate("/api/histories*").await;
        }
    }
}

/// Authenticated checkout endpoint
pub fn checkout_router<R: OrderRepository + 'static>(state: OrderState<R>) -> Router {
    Router::new().route("/", post(checkout)).with_state(state)
}

/// Authenticated purchase history endpoints
pub fn histories_router<R: OrderRepository + 'static>(service: Arc<OrderService<R>>) -> Router {
    Router::new()
        .route("/", get(list_histories))
        .route("/{no_invoice}", get(history_detail))
        .with_state(service)
}

/// Public order method lookup
pub fn order_methods_router<R: OrderRepository + 'static>(
    service: Arc<OrderService<R>>,
) -> Router {
    Router::new()
        .route("/", get(list_order_methods))
        .with_state(service)
}

/// Public payment method lookup
pub fn payment_methods_router<R: OrderRepository + 'static>(
    service: Arc<OrderService<R>>,
) -> Router {
    Router::new()
        .route("/", get(list_payment_methods))
        .with_state(service)
}

/// Admin transaction listing, detail, and status updates
pub fn admin_transactions_router<R: OrderRepository + 'static>(state: OrderState<R>) -> Router {
    Router::new()
        .route("/", get(admin_list))
        .route("/{id}", get(admin_detail).patch(update_status))
        .with_state(state)
}

/// POST /checkout
async fn checkout<R: OrderRepository>(
    State(state): State<OrderState<R>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<CheckoutRequest>,
) -> OrderResult<impl IntoResponse> {
    let response = state.service.checkout(auth.id, input).await?;
    state.invalidate_listings().await;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("Checkout successful", response)),
    ))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    page: Option<u64>,
    limit: Option<u64>,
    date: Option<String>,
    statusid: Option<i32>,
}

fn parse_history_date(raw: &str) -> Result<NaiveDate, OrderError> {
    if !DATE_FORMAT.is_match(raw) {
        return Err(OrderError::Validation(
            "Invalid date filter: expected YYYY-MM-DD".to_string(),
        ));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        OrderError::Validation("Invalid date filter: expected YYYY-MM-DD".to_string())
    })
}

/// GET /histories?page=&limit=&date=&statusid=
async fn list_histories<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> OrderResult<Json<ApiBody<Vec<TransactionSummary>>>> {
    let pagination = Pagination::new(query.page, query.limit, HISTORY_PAGE_SIZE);
    pagination
        .ensure_valid(MAX_HISTORY_PAGE_SIZE)
        .map_err(OrderError::Validation)?;

    let date = query.date.as_deref().map(parse_history_date).transpose()?;

    let (transactions, total) = service
        .list_histories(
            auth.id,
            HistoryFilter {
                date,
                status_id: query.statusid,
                limit: pagination.limit,
                offset: pagination.offset(),
            },
        )
        .await?;

    pagination
        .ensure_in_range(total)
        .map_err(OrderError::Validation)?;

    let meta = ListMeta::new(pagination.page, pagination.limit, total).with_links("/api/histories");
    Ok(Json(ApiBody::paginated(
        "Histories retrieved successfully",
        transactions.into_iter().map(Into::into).collect(),
        meta,
    )))
}

/// GET /histories/{no_invoice}
async fn history_detail<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    Extension(auth): Extension<AuthUser>,
    Path(no_invoice): Path<String>,
) -> OrderResult<Json<ApiBody<TransactionDetailResponse>>> {
    let detail = service.history_detail(auth.id, &no_invoice).await?;
    Ok(Json(ApiBody::new("History retrieved successfully", detail)))
}

/// GET /order-methods
async fn list_order_methods<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
) -> OrderResult<Json<ApiBody<Vec<OrderMethod>>>> {
    let methods = service.list_order_methods().await?;
    Ok(Json(ApiBody::new(
        "Order methods retrieved successfully",
        methods,
    )))
}

/// GET /payment-methods
async fn list_payment_methods<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
) -> OrderResult<Json<ApiBody<Vec<PaymentMethod>>>> {
    let methods = service.list_payment_methods().await?;
    Ok(Json(ApiBody::new(
        "Payment methods retrieved successfully",
        methods,
    )))
}

#[derive(Debug, Default, Deserialize)]
struct AdminListQuery {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
    status: Option<i32>,
}

/// GET /admin/transactions?page=&limit=&search=&status=
async fn admin_list<R: OrderRepository>(
    State(state): State<OrderState<R>>,
    Query(query): Query<AdminListQuery>,
) -> OrderResult<Json<ApiBody<Vec<TransactionSummary>>>> {
    let pagination = Pagination::new(query.page, query.limit, 10);
    pagination
        .ensure_valid(MAX_PAGE_SIZE)
        .map_err(OrderError::Validation)?;

    let (transactions, total) = state
        .service
        .list_admin(AdminTransactionFilter {
            search: query.search,
            status_id: query.status,
            limit: pagination.limit,
            offset: pagination.offset(),
        })
        .await?;

    pagination
        .ensure_in_range(total)
        .map_err(OrderError::Validation)?;

    let meta = ListMeta::new(pagination.page, pagination.limit, total)
        .with_links("/api/admin/transactions");
    Ok(Json(ApiBody::paginated(
        "Transactions retrieved successfully",
        transactions.into_iter().map(Into::into).collect(),
        meta,
    )))
}

/// GET /admin/transactions/{id}
async fn admin_detail<R: OrderRepository>(
    State(state): State<OrderState<R>>,
    Path(id): Path<i32>,
) -> OrderResult<Json<ApiBody<TransactionDetailResponse>>> {
    let detail = state.service.admin_detail(id).await?;
    Ok(Json(ApiBody::new(
        "Transaction retrieved successfully",
        detail,
    )))
}

/// PATCH /admin/transactions/{id}
async fn update_status<R: OrderRepository>(
    State(state): State<OrderState<R>>,
    Path(id): Path<i32>,
    auth: Option<Extension<AuthUser>>,
    ValidatedJson(input): ValidatedJson<UpdateStatusRequest>,
) -> OrderResult<Json<ApiBody<TransactionSummary>>> {
    // The auth middleware normally guarantees the extension; reject rather
    // than record a status change with no acting user.
    let Extension(auth) = auth.ok_or(OrderError::Unauthorized)?;
    let transaction = state
        .service
        .update_status(id, input.status_id, Some(auth.id))
        .await?;
    state.invalidate_listings().await;
    Ok(Json(ApiBody::new(
        "Transaction status updated successfully",
        transaction.into(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckoutLine, ContactInfo};
    use crate::repository::InMemoryOrderRepository;
    use crate::service::ContactProvider;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct StubContacts;

    #[async_trait]
    impl ContactProvider for StubContacts {
        async fn contact_for(&self, _user_id: i32) -> OrderResult<Option<ContactInfo>> {
            Ok(Some(ContactInfo {
                full_name: "Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                address: Some("Jl. Contoh 1".to_string()),
                phone: Some("0800000000".to_string()),
            }))
        }
    }

    fn line(cart_id: i32, product_id: i32, amount: i32, subtotal: f64) -> CheckoutLine {
        CheckoutLine {
            cart_id,
            product_id,
            product_name: format!("Product {}", product_id),
            product_price: subtotal / f64::from(amount),
            discount_percent: None,
            discount_price: None,
            size: None,
            size_cost: 0.0,
            variant: None,
            variant_cost: 0.0,
            amount,
            subtotal,
            stock: 10,
        }
    }

    async fn setup() -> (Arc<InMemoryOrderRepository>, Arc<OrderService<InMemoryOrderRepository>>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.seed_product(1, "Product 1", 10).await;
        repo.seed_product(2, "Product 2", 10).await;
        let service = Arc::new(OrderService::new(Arc::clone(&repo), Arc::new(StubContacts)));
        (repo, service)
    }

    fn as_user(router: Router) -> Router {
        router.layer(Extension(AuthUser {
            id: 7,
            role: "user".to_string(),
        }))
    }

    fn as_admin(router: Router) -> Router {
        router.layer(Extension(AuthUser {
            id: 1,
            role: "admin".to_string(),
        }))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_returns_pricing_breakdown() {
        let (repo, service) = setup().await;
        repo.seed_cart_line(7, line(1, 1, 2, 50000.0)).await;
        repo.seed_cart_line(7, line(2, 2, 1, 30000.0)).await;

        let app = as_user(checkout_router(OrderState {
            service,
            cache: None,
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"paymentMethodId":2,"orderMethodId":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["data"]["tax"], 8000.0);
        assert_eq!(body["data"]["deliveryFee"], 5000.0);
        assert_eq!(body["data"]["adminFee"], 2000.0);
        assert_eq!(body["data"]["totalTransaction"], 95000.0);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_400() {
        let (_, service) = setup().await;
        let app = as_user(checkout_router(OrderState {
            service,
            cache: None,
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"paymentMethodId":1,"orderMethodId":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Cart is empty");
    }

    #[tokio::test]
    async fn test_histories_rejects_bad_date() {
        let (_, service) = setup().await;
        let app = as_user(histories_router(service));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?date=07-03-2024")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Invalid date filter: expected YYYY-MM-DD");
    }

    #[tokio::test]
    async fn test_histories_limit_capped_at_ten() {
        let (_, service) = setup().await;
        let app = as_user(histories_router(service));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?limit=11")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_patch_rejects_denied_transition() {
        let (repo, service) = setup().await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0)).await;

        // Pick-Up order
        service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 3,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let app = as_admin(admin_transactions_router(OrderState {
            service,
            cache: None,
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"statusId":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["message"],
            "Status 'Sending Goods' is not allowed for 'Pick-Up' orders"
        );
    }

    #[tokio::test]
    async fn test_admin_patch_without_user_is_401() {
        let (repo, service) = setup().await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0)).await;
        service
            .checkout(
                7,
                CheckoutRequest {
                    payment_method_id: 1,
                    order_method_id: 2,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // No AuthUser extension layered on
        let app = admin_transactions_router(OrderState {
            service,
            cache: None,
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"statusId":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_checkout_applies_contact_overrides_from_body() {
        let (repo, service) = setup().await;
        repo.seed_cart_line(7, line(1, 1, 1, 20000.0)).await;

        let app = as_user(checkout_router(OrderState {
            service: Arc::clone(&service),
            cache: None,
        }));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"paymentMethodId":1,"orderMethodId":2,"fullName":"Gift Recipient","address":"Jl. Baru 2"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let no_invoice = body["data"]["noInvoice"].as_str().unwrap().to_string();

        let detail = service.history_detail(7, &no_invoice).await.unwrap();
        assert_eq!(detail.full_name, "Gift Recipient");
        assert_eq!(detail.address.as_deref(), Some("Jl. Baru 2"));
        // No override for email or phone, so the profile values stick
        assert_eq!(detail.email, "buyer@example.com");
        assert_eq!(detail.phone.as_deref(), Some("0800000000"));
    }

    #[tokio::test]
    async fn test_lookup_endpoints_return_seeded_rows() {
        let (_, service) = setup().await;

        let app = order_methods_router(Arc::clone(&service));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"][1]["deliveryFee"], 5000.0);

        let app = payment_methods_router(service);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"][1]["adminFee"], 2000.0);
    }
}
