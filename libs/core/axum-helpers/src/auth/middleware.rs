use super::jwt::JwtAuth;
use crate::errors::error_response;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Authenticated user extracted from a verified token.
///
/// Inserted into request extensions by [`auth_middleware`]; handlers read it
/// with `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub role: String,
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
}

/// JWT authentication middleware.
///
/// Requires a `Bearer` token, verifies signature and expiry, and rejects
/// tokens present in the revocation blacklist. On success an [`AuthUser`] is
/// inserted into request extensions.
pub async fn auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&headers).ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            "Authorization header required or invalid format",
        )
    })?;

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        error_response(StatusCode::UNAUTHORIZED, "Failed to verify token")
    })?;

    if auth.is_revoked(&token).await {
        tracing::debug!(user_id = claims.sub, "Rejected revoked token");
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Token has been revoked",
        ));
    }

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        role: claims.role,
    });
    // The raw token is kept for the logout handler
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Raw bearer token, available to handlers that need it (logout)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert!(extract_bearer_token(&headers).is_none());
        assert!(extract_bearer_token(&HeaderMap::new()).is_none());
    }
}
