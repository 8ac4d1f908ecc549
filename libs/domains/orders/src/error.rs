use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Transaction {0} not found")]
    TransactionNotFound(i32),

    #[error("Transaction with invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Order method {0} not found")]
    OrderMethodNotFound(i32),

    #[error("Payment method {0} not found")]
    PaymentMethodNotFound(i32),

    #[error("Status {0} not found")]
    StatusNotFound(i32),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for '{product}': available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("{0}")]
    InvalidTransition(String),

    /// Raised by the repository when the generated invoice number already
    /// exists; the service retries with a fresh suffix.
    #[error("Invoice number '{0}' already exists")]
    DuplicateInvoice(String),

    #[error("Could not generate a unique invoice number")]
    InvoiceCollision,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<sea_orm::DbErr> for OrderError {
    fn from(err: sea_orm::DbErr) -> Self {
        OrderError::Database(err.to_string())
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            OrderError::TransactionNotFound(_)
            | OrderError::InvoiceNotFound(_)
            | OrderError::UserNotFound(_)
            | OrderError::OrderMethodNotFound(_)
            | OrderError::PaymentMethodNotFound(_)
            | OrderError::StatusNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorBody::new(self.to_string()))
            }
            OrderError::EmptyCart
            | OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition(_) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new(self.to_string()))
            }
            OrderError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
            OrderError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, ErrorBody::new(self.to_string()))
            }
            OrderError::DuplicateInvoice(_) | OrderError::InvoiceCollision => (
                StatusCode::CONFLICT,
                ErrorBody::new("Could not generate a unique invoice number"),
            ),
            OrderError::Database(msg) => {
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
