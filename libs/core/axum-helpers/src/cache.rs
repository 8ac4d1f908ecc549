//! Read-through response cache backed by Redis.
//!
//! Cacheable GETs are keyed by the full request path + query string; hits are
//! returned verbatim without invoking the downstream handler, misses store a
//! copy of the JSON response for one hour. Writes call
//! [`ResponseCache::invalidate`] with a wildcard pattern. Every cache failure
//! degrades to a passthrough: a slow or down Redis never fails the request.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use redis::{aio::ConnectionManager, AsyncCommands};

/// Time-to-live for cached responses (one hour)
pub const RESPONSE_TTL_SECONDS: u64 = 3600;

/// Redis-backed cache of serialized JSON response bodies
#[derive(Clone)]
pub struct ResponseCache {
    redis: ConnectionManager,
    ttl_seconds: u64,
}

impl ResponseCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis,
            ttl_seconds: RESPONSE_TTL_SECONDS,
        }
    }

    #[cfg(test)]
    fn with_ttl(redis: ConnectionManager, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    /// Look up a cached body. Errors are logged and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut conn = self.redis.clone();
        match conn.get::<_, Option<Vec<u8>>>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key, "Cache read failed: {}", e);
                None
            }
        }
    }

    /// Store a body under the key with the configured TTL. Best-effort.
    pub async fn put(&self, key: &str, body: &[u8]) {
        let mut conn = self.redis.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, body, self.ttl_seconds).await {
            tracing::warn!(key, "Cache write failed: {}", e);
        }
    }

    /// Delete all keys matching a wildcard pattern in one batch.
    ///
    /// Used after any write that could change a previously cached listing.
    /// Errors are logged and swallowed, never surfaced to the caller.
    pub async fn invalidate(&self, pattern: &str) {
        let mut conn = self.redis.clone();

        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(pattern, "Cache invalidation lookup failed: {}", e);
                return;
            }
        };

        if keys.is_empty() {
            return;
        }

        let count = keys.len();
        if let Err(e) = conn.del::<_, ()>(keys).await {
            tracing::warn!(pattern, "Cache invalidation delete failed: {}", e);
        } else {
            tracing::debug!(pattern, count, "Invalidated cached responses");
        }
    }
}

/// Cache key: full request path + query string
fn cache_key(request: &Request) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Read-through caching middleware for GET endpoints.
///
/// Layer this on routes whose listings are expensive to recompute. Only 200
/// JSON responses are stored.
pub async fn cache_middleware(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);

    if let Some(body) = cache.get(&key).await {
        tracing::debug!(key, "Cache hit");
        let mut response = Response::new(Body::from(body));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        return response;
    }

    let response = next.run(request).await;

    if response.status() != StatusCode::OK || !is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            cache.put(&key, &bytes).await;
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(key, "Failed to buffer response body: {}", e);
            crate::errors::error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process response",
            )
        }
    }
}
