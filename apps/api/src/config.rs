//! Configuration for the kedai API

use core_config::{
    auth::AuthConfig, database::DatabaseConfig, redis::RedisConfig, server::ServerConfig,
    env_or_default, FromEnv,
};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Base URL embedded in password reset emails.
    pub reset_base_url: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let auth = AuthConfig::from_env()?;
        let database = DatabaseConfig::from_env()?;
        let redis = RedisConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        let reset_base_url = env_or_default(
            "PASSWORD_RESET_URL",
            "http://localhost:8080/reset-password",
        );

        Ok(Self {
            auth,
            database,
            redis,
            server,
            environment,
            reset_base_url,
        })
    }
}
