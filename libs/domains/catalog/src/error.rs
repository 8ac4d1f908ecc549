use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    ProductNotFound(i32),

    #[error("Category {0} not found")]
    CategoryNotFound(i32),

    #[error("Size {0} not found")]
    SizeNotFound(i32),

    #[error("Variant {0} not found")]
    VariantNotFound(i32),

    #[error("'{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<sea_orm::DbErr> for CatalogError {
    fn from(err: sea_orm::DbErr) -> Self {
        CatalogError::Database(err.to_string())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            CatalogError::ProductNotFound(_)
            | CatalogError::CategoryNotFound(_)
            | CatalogError::SizeNotFound(_)
            | CatalogError::VariantNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(self.to_string()))
            }
            CatalogError::DuplicateName(_) => (StatusCode::CONFLICT, ErrorBody::new(self.to_string())),
            CatalogError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
            CatalogError::Database(msg) => {
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
