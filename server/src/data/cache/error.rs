//! Cache error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache configuration error: {0}")]
    Config(String),

    #[error("Cache connection error: {0}")]
    Connection(String),

    /// A stored value is not the JSON shape the reader expects
    #[error("Undecodable cache value {0}")]
    Decode(String),

    #[error("Cache seed failed: {0}")]
    Seed(String),

    #[error("Redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
}
