//! Database library providing explicitly constructed connectors for
//! PostgreSQL (SeaORM) and Redis.
//!
//! Connections are created at startup, injected into components, and closed
//! during graceful shutdown. Nothing here is a process-wide singleton.
//!
//! # Examples
//!
//! ```ignore
//! use core_config::{database::DatabaseConfig, redis::RedisConfig, FromEnv};
//!
//! let db = database::postgres::connect_with_retry(&DatabaseConfig::from_env()?, None).await?;
//! let redis = database::redis::connect_with_retry(&RedisConfig::from_env()?, None).await?;
//! ```

pub mod common;
pub mod postgres;
pub mod redis;

pub use common::RetryConfig;
