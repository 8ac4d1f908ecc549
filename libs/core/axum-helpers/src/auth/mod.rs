//! JWT authentication with a Redis-backed token revocation blacklist.
//!
//! Logout stores the raw token under `blacklist:{token}` with a TTL equal to
//! the token's remaining validity, so the entry self-expires exactly when the
//! token would have anyway. The middleware checks this key on every
//! authenticated request before trusting the signature verdict.

mod jwt;
mod middleware;

pub use jwt::{Claims, JwtAuth, RevocationError, BLACKLIST_PREFIX};
pub use middleware::{auth_middleware, AuthUser, BearerToken};
