//! Error response body shared by every handler boundary.
//!
//! Errors never cross the HTTP boundary unformatted: each domain error maps
//! to `{success:false, message, error?}` with the status taxonomy
//! Validation=400, Unauthorized=401, NotFound=404, Conflict=409, rest=500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body: `{success:false, message, error?}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

/// Build an error response with the given status and message
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// Build a 500 response, surfacing the underlying error in the `error` field
pub fn internal_error(message: impl Into<String>, error: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_error(message, error.to_string())),
    )
        .into_response()
}

/// Fallback handler for unmatched routes
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_omits_empty_error_field() {
        let body = serde_json::to_value(ErrorBody::new("nope")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "nope");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_error_body_includes_error_detail() {
        let body = serde_json::to_value(ErrorBody::with_error("failed", "boom")).unwrap();
        assert_eq!(body["error"], "boom");
    }
}
