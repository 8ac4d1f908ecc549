use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart {0} not found")]
    NotFound(i32),

    #[error("Product {0} not found")]
    ProductNotFound(i32),

    #[error("Size {0} not found")]
    SizeNotFound(i32),

    #[error("Variant {0} not found")]
    VariantNotFound(i32),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CartResult<T> = Result<T, CartError>;

impl From<sea_orm::DbErr> for CartError {
    fn from(err: sea_orm::DbErr) -> Self {
        CartError::Database(err.to_string())
    }
}

impl From<domain_catalog::CatalogError> for CartError {
    fn from(err: domain_catalog::CatalogError) -> Self {
        use domain_catalog::CatalogError;
        match err {
            CatalogError::ProductNotFound(id) => CartError::ProductNotFound(id),
            CatalogError::SizeNotFound(id) => CartError::SizeNotFound(id),
            CatalogError::VariantNotFound(id) => CartError::VariantNotFound(id),
            CatalogError::Validation(msg) => CartError::Validation(msg),
            other => CartError::Database(other.to_string()),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CartError::NotFound(_)
            | CartError::ProductNotFound(_)
            | CartError::SizeNotFound(_)
            | CartError::VariantNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(self.to_string()))
            }
            CartError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
            CartError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_error("An internal error occurred", msg.clone()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
