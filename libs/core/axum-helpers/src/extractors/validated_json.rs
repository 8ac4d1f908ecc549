//! JSON extractor with automatic validation using the validator crate.

use crate::errors::ErrorBody;
use axum::{
    extract::{FromRequest, Json, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that runs the `validator` crate's `Validate` on the body.
///
/// Rejections use the standard error body so malformed input never leaks a
/// framework-shaped error.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_error("Invalid JSON body", e.to_string())),
            )
                .into_response()
        })?;

        data.validate().map_err(|e| {
            let detail = e
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |err| {
                        let message = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string());
                        format!("{}: {}", field, message)
                    })
                })
                .collect::<Vec<_>>()
                .join("; ");

            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::with_error("Request validation failed", detail)),
            )
                .into_response()
        })?;

        Ok(ValidatedJson(data))
    }
}
