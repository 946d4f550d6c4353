//! In-memory cache implementation using moka
//!
//! Holds whatever the seed file (or tests) put into it. Nothing outside the
//! process can write here, so in production the Redis backend is the one the
//! refresh job shares with the dashboard.

use async_trait::async_trait;
use moka::future::Cache;

use super::backend::CacheBackend;
use super::error::CacheError;

/// Bounded in-process store backed by `moka::future::Cache`
pub struct InMemoryCache {
    entries: Cache<String, Vec<u8>>,
}

impl InMemoryCache {
    /// At most `max_entries` keys; moka evicts with TinyLFU past that
    pub fn new(max_entries: u64) -> Self {
        Self {
            entries: Cache::new(max_entries),
        }
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.get(key).await)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value).await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
