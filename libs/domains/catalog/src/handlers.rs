use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{ApiBody, ListMeta, Pagination, ResponseCache, ValidatedJson};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    Category, CategoryRequest, CreateProductRequest, ProductFilter, ProductResponse, Size,
    SizeRequest, UpdateProductRequest, Variant, VariantRequest,
};
use crate::repository::CatalogRepository;
use crate::service::CatalogService;

const MAX_PAGE_SIZE: u64 = 100;

/// Admin handlers need the cache handle to invalidate cached product pages
/// after writes. `None` disables invalidation (tests).
pub struct AdminCatalogState<R: CatalogRepository> {
    pub service: Arc<CatalogService<R>>,
    pub cache: Option<ResponseCache>,
}

impl<R: CatalogRepository> Clone for AdminCatalogState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            cache: self.cache.clone(),
        }
    }
}

impl<R: CatalogRepository> AdminCatalogState<R> {
    async fn invalidate_products(&self) {
        if let Some(ref cache) = self.cache {
            cache.invalidate("/api/products*").await;
        }
    }
}

/// Public product browsing
pub fn products_router<R: CatalogRepository + 'static>(
    service: Arc<CatalogService<R>>,
) -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .with_state(service)
}

/// Public category listing
pub fn categories_router<R: CatalogRepository + 'static>(
    service: Arc<CatalogService<R>>,
) -> Router {
    Router::new()
        .route("/", get(list_categories))
        .with_state(service)
}

/// Admin product CRUD
pub fn admin_products_router<R: CatalogRepository + 'static>(
    state: AdminCatalogState<R>,
) -> Router {
    Router::new()
        .route("/", get(admin_list_products).post(create_product))
        .route(
            "/{id}",
            get(admin_get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

/// Admin category CRUD
pub fn admin_categories_router<R: CatalogRepository + 'static>(
    state: AdminCatalogState<R>,
) -> Router {
    Router::new()
        .route("/", get(admin_list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .with_state(state)
}

/// Admin size CRUD
pub fn admin_sizes_router<R: CatalogRepository + 'static>(state: AdminCatalogState<R>) -> Router {
    Router::new()
        .route("/", get(list_sizes).post(create_size))
        .route("/{id}", get(get_size).put(update_size).delete(delete_size))
        .with_state(state)
}

/// Admin variant CRUD
pub fn admin_variants_router<R: CatalogRepository + 'static>(
    state: AdminCatalogState<R>,
) -> Router {
    Router::new()
        .route("/", get(list_variants).post(create_variant))
        .route(
            "/{id}",
            get(get_variant).put(update_variant).delete(delete_variant),
        )
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct ListProductsQuery {
    page: Option<u64>,
    limit: Option<u64>,
    search: Option<String>,
    category: Option<i32>,
    flash_sale: Option<bool>,
}

async fn list_page<R: CatalogRepository>(
    service: &CatalogService<R>,
    query: ListProductsQuery,
    base_path: &str,
) -> CatalogResult<Json<ApiBody<Vec<ProductResponse>>>> {
    let pagination = Pagination::new(query.page, query.limit, 10);
    pagination
        .ensure_valid(MAX_PAGE_SIZE)
        .map_err(CatalogError::Validation)?;

    let (products, total) = service
        .list_products(ProductFilter {
            search: query.search,
            category_id: query.category,
            flash_sale: query.flash_sale,
            limit: pagination.limit,
            offset: pagination.offset(),
        })
        .await?;

    pagination
        .ensure_in_range(total)
        .map_err(CatalogError::Validation)?;

    let meta = ListMeta::new(pagination.page, pagination.limit, total).with_links(base_path);
    Ok(Json(ApiBody::paginated(
        "Products retrieved successfully",
        products.into_iter().map(Into::into).collect(),
        meta,
    )))
}

/// GET /products
async fn list_products<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<ListProductsQuery>,
) -> CatalogResult<Json<ApiBody<Vec<ProductResponse>>>> {
    list_page(&service, query, "/api/products").await
}

/// GET /products/{id}
async fn get_product<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<ProductResponse>>> {
    let product = service.get_product(id).await?;
    Ok(Json(ApiBody::new(
        "Product retrieved successfully",
        product.into(),
    )))
}

/// GET /categories
async fn list_categories<R: CatalogRepository>(
    State(service): State<Arc<CatalogService<R>>>,
) -> CatalogResult<Json<ApiBody<Vec<Category>>>> {
    let categories = service.list_categories().await?;
    Ok(Json(ApiBody::new(
        "Categories retrieved successfully",
        categories,
    )))
}

/// GET /admin/products
async fn admin_list_products<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Query(query): Query<ListProductsQuery>,
) -> CatalogResult<Json<ApiBody<Vec<ProductResponse>>>> {
    list_page(&state.service, query, "/api/admin/products").await
}

/// GET /admin/products/{id}
async fn admin_get_product<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<ProductResponse>>> {
    let product = state.service.get_product(id).await?;
    Ok(Json(ApiBody::new(
        "Product retrieved successfully",
        product.into(),
    )))
}

/// POST /admin/products
async fn create_product<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    auth: Option<axum::Extension<axum_helpers::AuthUser>>,
    ValidatedJson(input): ValidatedJson<CreateProductRequest>,
) -> CatalogResult<impl IntoResponse> {
    let created_by = auth.map(|a| a.id);
    let product = state.service.create_product(input, created_by).await?;
    state.invalidate_products().await;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new(
            "Product created successfully",
            ProductResponse::from(product),
        )),
    ))
}

/// PUT /admin/products/{id}
async fn update_product<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
    auth: Option<axum::Extension<axum_helpers::AuthUser>>,
    ValidatedJson(input): ValidatedJson<UpdateProductRequest>,
) -> CatalogResult<Json<ApiBody<ProductResponse>>> {
    let updated_by = auth.map(|a| a.id);
    let product = state.service.update_product(id, input, updated_by).await?;
    state.invalidate_products().await;
    Ok(Json(ApiBody::new(
        "Product updated successfully",
        product.into(),
    )))
}

/// DELETE /admin/products/{id}
async fn delete_product<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<()>>> {
    state.service.delete_product(id).await?;
    state.invalidate_products().await;
    Ok(Json(ApiBody::<()>::message_only("Product deleted successfully")))
}

/// GET /admin/categories
async fn admin_list_categories<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
) -> CatalogResult<Json<ApiBody<Vec<Category>>>> {
    let categories = state.service.list_categories().await?;
    Ok(Json(ApiBody::new(
        "Categories retrieved successfully",
        categories,
    )))
}

/// GET /admin/categories/{id}
async fn get_category<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<Category>>> {
    let category = state.service.get_category(id).await?;
    Ok(Json(ApiBody::new("Category retrieved successfully", category)))
}

/// POST /admin/categories
async fn create_category<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    ValidatedJson(input): ValidatedJson<CategoryRequest>,
) -> CatalogResult<impl IntoResponse> {
    let category = state.service.create_category(input).await?;
    state.invalidate_products().await;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("Category created successfully", category)),
    ))
}

/// PUT /admin/categories/{id}
async fn update_category<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<CategoryRequest>,
) -> CatalogResult<Json<ApiBody<Category>>> {
    let category = state.service.update_category(id, input).await?;
    state.invalidate_products().await;
    Ok(Json(ApiBody::new("Category updated successfully", category)))
}

/// DELETE /admin/categories/{id}
async fn delete_category<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<()>>> {
    state.service.delete_category(id).await?;
    state.invalidate_products().await;
    Ok(Json(ApiBody::<()>::message_only("Category deleted successfully")))
}

/// GET /admin/sizes
async fn list_sizes<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
) -> CatalogResult<Json<ApiBody<Vec<Size>>>> {
    let sizes = state.service.list_sizes().await?;
    Ok(Json(ApiBody::new("Sizes retrieved successfully", sizes)))
}

/// GET /admin/sizes/{id}
async fn get_size<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<Size>>> {
    let size = state.service.get_size(id).await?;
    Ok(Json(ApiBody::new("Size retrieved successfully", size)))
}

/// POST /admin/sizes
async fn create_size<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    ValidatedJson(input): ValidatedJson<SizeRequest>,
) -> CatalogResult<impl IntoResponse> {
    let size = state.service.create_size(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("Size created successfully", size)),
    ))
}

/// PUT /admin/sizes/{id}
async fn update_size<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<SizeRequest>,
) -> CatalogResult<Json<ApiBody<Size>>> {
    let size = state.service.update_size(id, input).await?;
    Ok(Json(ApiBody::new("Size updated successfully", size)))
}

/// DELETE /admin/sizes/{id}
async fn delete_size<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<()>>> {
    state.service.delete_size(id).await?;
    Ok(Json(ApiBody::<()>::message_only("Size deleted successfully")))
}

/// GET /admin/variants
async fn list_variants<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
) -> CatalogResult<Json<ApiBody<Vec<Variant>>>> {
    let variants = state.service.list_variants().await?;
    Ok(Json(ApiBody::new("Variants retrieved successfully", variants)))
}

/// GET /admin/variants/{id}
async fn get_variant<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<Variant>>> {
    let variant = state.service.get_variant(id).await?;
    Ok(Json(ApiBody::new("Variant retrieved successfully", variant)))
}

/// POST /admin/variants
async fn create_variant<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    ValidatedJson(input): ValidatedJson<VariantRequest>,
) -> CatalogResult<impl IntoResponse> {
    let variant = state.service.create_variant(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiBody::new("Variant created successfully", variant)),
    ))
}

/// PUT /admin/variants/{id}
async fn update_variant<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
    ValidatedJson(input): ValidatedJson<VariantRequest>,
) -> CatalogResult<Json<ApiBody<Variant>>> {
    let variant = state.service.update_variant(id, input).await?;
    Ok(Json(ApiBody::new("Variant updated successfully", variant)))
}

/// DELETE /admin/variants/{id}
async fn delete_variant<R: CatalogRepository>(
    State(state): State<AdminCatalogState<R>>,
    Path(id): Path<i32>,
) -> CatalogResult<Json<ApiBody<()>>> {
    state.service.delete_variant(id).await?;
    Ok(Json(ApiBody::<()>::message_only("Variant deleted successfully")))
}
