use crate::{env_or_default, env_required, ConfigError, FromEnv};

/// JWT authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub token_ttl: i64,
}

impl AuthConfig {
    pub fn new(secret: String, token_ttl: i64) -> Self {
        Self { secret, token_ttl }
    }
}

impl FromEnv for AuthConfig {
    /// Requires APP_SECRET; JWT_TTL_SECONDS defaults to 24 hours
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("APP_SECRET")?;
        let token_ttl = env_or_default("JWT_TTL_SECONDS", "86400")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "JWT_TTL_SECONDS".to_string(),
                details: format!("{}", e),
            })?;

        Ok(Self { secret, token_ttl })
    }
}
