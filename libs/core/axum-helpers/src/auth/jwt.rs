use chrono::{Duration, Utc};
use core_config::auth::AuthConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Key prefix for revoked tokens
pub const BLACKLIST_PREFIX: &str = "blacklist:";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    /// User role ("user" or "admin")
    pub role: String,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// JWT id
    pub jti: String,
}

/// Errors from the logout/revocation path
#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("Failed to verify token: {0}")]
    InvalidToken(String),

    #[error("Token is already expired")]
    AlreadyExpired,

    #[error("Failed to store revoked token: {0}")]
    Store(#[from] redis::RedisError),
}

/// JWT signing/verification plus the Redis revocation blacklist.
///
/// Constructed once at startup from [`AuthConfig`] and the shared Redis
/// connection manager, then cloned into whatever needs it.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    token_ttl: i64,
    redis: ConnectionManager,
}

impl JwtAuth {
    pub fn new(redis: ConnectionManager, config: &AuthConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            token_ttl: config.token_ttl,
            redis,
        }
    }

    /// Create an HS256 token for the given user
    pub fn create_token(&self, user_id: i32, role: &str) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp: (now + Duration::seconds(self.token_ttl)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify signature and expiry, returning the decoded claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Revoke a token (logout).
    ///
    /// Verifies the token, computes its remaining lifetime from the `exp`
    /// claim, and stores `blacklist:{token}` with exactly that TTL. A token
    /// with no remaining lifetime is rejected; its signature verification
    /// would fail on the next request anyway.
    pub async fn revoke_token(&self, token: &str) -> Result<(), RevocationError> {
        let claims = self
            .verify_token(token)
            .map_err(|e| RevocationError::InvalidToken(e.to_string()))?;

        let remaining = claims.exp - Utc::now().timestamp();
        if remaining <= 0 {
            return Err(RevocationError::AlreadyExpired);
        }

        let key = format!("{}{}", BLACKLIST_PREFIX, token);
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, "1", remaining as u64).await?;

        tracing::info!(user_id = claims.sub, ttl = remaining, "Token revoked");
        Ok(())
    }

    /// Check whether a token has been revoked.
    ///
    /// A Redis failure here is logged and treated as "not revoked": blacklist
    /// checks never change the primary request outcome (revocation itself is
    /// the only call that surfaces store errors).
    pub async fn is_revoked(&self, token: &str) -> bool {
        let key = format!("{}{}", BLACKLIST_PREFIX, token);
        let mut conn = self.redis.clone();

        match conn.exists::<_, bool>(&key).await {
            Ok(revoked) => revoked,
            Err(e) => {
                tracing::warn!("Blacklist check failed, allowing request: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::TestRedis;

    fn test_config(ttl: i64) -> AuthConfig {
        AuthConfig::new("test-secret".to_string(), ttl)
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Redis container
    async fn test_round_trip_and_revocation() {
        let redis = TestRedis::new().await;
        let manager = redis.connection_manager().await;
        let auth = JwtAuth::new(manager, &test_config(3600));

        let token = auth.create_token(42, "user").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "user");

        assert!(!auth.is_revoked(&token).await);
        auth.revoke_token(&token).await.unwrap();
        assert!(auth.is_revoked(&token).await);
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Redis container
    async fn test_blacklist_entry_expires_with_token() {
        let redis = TestRedis::new().await;
        let manager = redis.connection_manager().await;
        let auth = JwtAuth::new(manager.clone(), &test_config(2));

        let token = auth.create_token(7, "user").unwrap();
        auth.revoke_token(&token).await.unwrap();
        assert!(auth.is_revoked(&token).await);

        tokio::time::sleep(std::time::Duration::from_secs(3)).await;

        // The blacklist key self-expired; the token now fails on expiry instead
        assert!(!auth.is_revoked(&token).await);
        assert!(auth.verify_token(&token).is_err());
    }

    #[tokio::test]
    #[ignore] // Requires Docker for the Redis container
    async fn test_revoking_expired_token_fails() {
        let redis = TestRedis::new().await;
        let manager = redis.connection_manager().await;

        // Issue a token that is already expired (negative TTL, outside leeway)
        let auth = JwtAuth::new(manager, &test_config(-120));
        let token = auth.create_token(7, "user").unwrap();

        let err = auth.revoke_token(&token).await.unwrap_err();
        assert!(matches!(
            err,
            RevocationError::InvalidToken(_) | RevocationError::AlreadyExpired
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        // Pure-JWT check, no Redis involved: build with a dummy manager is not
        // possible, so sign/verify with jsonwebtoken directly.
        let claims = Claims {
            sub: 1,
            role: "user".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            jti: "x".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret-a"),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secret-b"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
