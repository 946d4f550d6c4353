//! Redis-compatible cache implementation using deadpool-redis
//!
//! This is the backend shared with the external refresh job. The job writes
//! the dashboard datasets as JSON strings; the dashboard reads them.
//!
//! Accepted URL schemes: `redis://` and `rediss://` (TLS). Sentinel URLs are
//! rejected up front; point the dashboard at the current primary instead.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Pool, Runtime};

use super::backend::CacheBackend;
use super::error::CacheError;

/// Page views fan out several reads at once, so the pool is sized above the
/// deadpool default of 16.
const POOL_MAX_SIZE: usize = 32;

const POOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-compatible cache (Redis, Valkey, Dragonfly)
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Connect to a Redis-compatible server and verify it answers PING
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let sanitized_url = sanitize_redis_url(redis_url);
        check_scheme(redis_url, &sanitized_url)?;

        let mut config = Config::from_url(redis_url);
        config.pool = Some(deadpool_redis::PoolConfig {
            max_size: POOL_MAX_SIZE,
            timeouts: deadpool_redis::Timeouts {
                wait: Some(POOL_TIMEOUT),
                create: Some(POOL_TIMEOUT),
                recycle: Some(POOL_TIMEOUT),
            },
            ..Default::default()
        });
        let pool = config.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            CacheError::Connection(format!(
                "Failed to create Redis pool for {sanitized_url}: {e}"
            ))
        })?;

        let mut conn = pool.get().await.map_err(|e| {
            CacheError::Connection(format!(
                "Failed to get Redis connection for {sanitized_url}: {e}"
            ))
        })?;
        deadpool_redis::redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| {
                CacheError::Connection(format!("Redis PING failed for {sanitized_url}: {e}"))
            })?;

        tracing::debug!(url = %sanitized_url, "Redis cache connected");

        Ok(Self { pool })
    }
}

/// Only plain and TLS connections; the pool cannot follow a Sentinel failover
fn check_scheme(url: &str, sanitized_url: &str) -> Result<(), CacheError> {
    match url.split_once("://").map(|(scheme, _)| scheme) {
        Some("redis" | "rediss") => Ok(()),
        Some(scheme) if scheme.ends_with("+sentinel") => Err(CacheError::Config(format!(
            "Redis Sentinel is not supported ({sanitized_url}); use the primary's redis:// URL"
        ))),
        _ => Err(CacheError::Config(format!(
            "Unsupported Redis URL {sanitized_url}; expected redis:// or rediss://"
        ))),
    }
}

/// Mask the password of a Redis URL for logging
fn sanitize_redis_url(url: &str) -> String {
    // rfind: passwords may themselves contain '@'
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[scheme_end..at_pos].find(':') {
        Some(colon_pos) => {
            let abs_colon = scheme_end + colon_pos;
            format!("{}***{}", &url[..=abs_colon], &url[at_pos..])
        }
        None => url.to_string(),
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.pool.get().await?;
        let result: Option<Vec<u8>> = conn.get(key).await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        deadpool_redis::redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
