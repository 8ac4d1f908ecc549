use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_helpers::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User {0} not found")]
    NotFound(i32),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        UserError::Database(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(format!("User {} not found", id)),
            ),
            UserError::DuplicateEmail(email) => (
                StatusCode::CONFLICT,
                ErrorBody::new(format!("User with email '{}' already exists", email)),
            ),
            UserError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Invalid email or password"),
            ),
            UserError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg.clone())),
            UserError::InvalidResetToken => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Invalid or expired reset token"),
            ),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_error("An internal error occurred", msg.clone()),
                )
            }
            UserError::Token(msg) => {
                tracing::error!("Token error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_error("An internal error occurred", msg.clone()),
                )
            }
            UserError::Email(msg) => {
                tracing::error!("Email error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::with_error("Failed to send email", msg.clone()),
                )
            }
            UserError::Database(msg) => {
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
