//! Cache module
//!
//! Provides caching infrastructure with pluggable backends:
//! - In-memory (default) - uses moka
//! - Redis (optional) - uses deadpool-redis
//!
//! Values are JSON documents, the format the refresh job writes.

mod backend;
mod error;
mod key;
mod memory;
mod redis;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::CacheBackend;
pub use error::CacheError;
pub use key::CacheKey;

use memory::InMemoryCache;

use crate::core::config::{CacheBackendType, CacheConfig};

/// Cache service providing typed access to cache backend
///
/// Wraps the underlying cache backend and provides:
/// - Raw bytes API for flexibility
/// - Typed API using JSON serialization
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl CacheService {
    /// Create a new cache service from configuration
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendType::Memory => {
                tracing::debug!(
                    max_entries = config.max_entries,
                    "Initializing in-memory cache"
                );
                Arc::new(InMemoryCache::new(config.max_entries))
            }
            CacheBackendType::Redis => {
                let url = config.redis_url.as_ref().ok_or_else(|| {
                    CacheError::Config("redis_url required for Redis backend".into())
                })?;
                Arc::new(redis::RedisCache::new(url).await?)
            }
        };

        Ok(Self { backend })
    }

    /// Wrap an existing backend
    pub fn from_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Get the backend name
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    // =========================================================================
    // Raw bytes API
    // =========================================================================

    /// Get raw bytes from cache
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    /// Set raw bytes in cache
    pub async fn set_raw(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.backend.set(key, value).await
    }

    // =========================================================================
    // Typed API (serde)
    // =========================================================================

    /// Get a typed value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key).await? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Decode(format!("{key}: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value in cache
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| CacheError::Decode(format!("{key}: {e}")))?;
        self.set_raw(key, bytes).await
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Health check
    pub async fn health_check(&self) -> Result<(), CacheError> {
        self.backend.health_check().await
    }

    /// Load a JSON object of `key -> value` into the cache.
    ///
    /// Used at startup so the in-memory backend can serve a dashboard without
    /// an external writer. Returns the number of keys written.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize, CacheError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            CacheError::Seed(format!(
                "Failed to read seed file {}: {e}",
                path.display()
            ))
        })?;
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            CacheError::Seed(format!("{} is not valid JSON: {e}", path.display()))
        })?;
        let serde_json::Value::Object(entries) = value else {
            return Err(CacheError::Seed(format!(
                "Seed file {} must contain a JSON object",
                path.display()
            )));
        };

        let count = entries.len();
        for (key, value) in entries {
            self.set(&key, &value).await?;
        }
        tracing::debug!(path = %path.display(), keys = count, "Cache seeded");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn test_config() -> CacheConfig {
        CacheConfig {
            backend: CacheBackendType::Memory,
            max_entries: 1000,
            redis_url: None,
            seed_file: None,
        }
    }

    #[tokio::test]
    async fn test_cache_service_backend_name() {
        let service = CacheService::new(&test_config()).await.unwrap();
        assert_eq!(service.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_redis_backend_requires_url() {
        let config = CacheConfig {
            backend: CacheBackendType::Redis,
            ..test_config()
        };
        let err = CacheService::new(&config).await.unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[tokio::test]
    async fn test_typed_get_set() {
        let service = CacheService::new(&test_config()).await.unwrap();

        #[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
        struct Case {
            case_number: String,
            account: String,
        }

        let case = Case {
            case_number: "03123456".to_string(),
            account: "Acme Telco".to_string(),
        };

        service.set("case:1", &case).await.unwrap();
        let fetched: Option<Case> = service.get("case:1").await.unwrap();
        assert_eq!(fetched, Some(case));
    }

    #[tokio::test]
    async fn test_typed_get_reports_undecodable_value() {
        let service = CacheService::new(&test_config()).await.unwrap();
        service.set_raw("plots", b"not json".to_vec()).await.unwrap();

        let err = service
            .get::<serde_json::Value>("plots")
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Decode(ref m) if m.starts_with("plots:")));
    }

    #[tokio::test]
    async fn test_health_check() {
        let service = CacheService::new(&test_config()).await.unwrap();
        assert!(service.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_seed_from_file() {
        let service = CacheService::new(&test_config()).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"timestamp": "2024-01-02 08:00:00", "plots": {{"escalated": [1, 2]}}}}"#
        )
        .unwrap();

        let count = service.seed_from_file(file.path()).await.unwrap();
        assert_eq!(count, 2);

        let ts: Option<String> = service.get("timestamp").await.unwrap();
        assert_eq!(ts.as_deref(), Some("2024-01-02 08:00:00"));
        let plots: Option<serde_json::Value> = service.get("plots").await.unwrap();
        assert_eq!(plots, Some(serde_json::json!({ "escalated": [1, 2] })));
    }

    #[tokio::test]
    async fn test_seed_from_file_rejects_non_object() {
        let service = CacheService::new(&test_config()).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let err = service.seed_from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, CacheError::Seed(_)));
    }

    #[tokio::test]
    async fn test_seed_from_file_rejects_invalid_json() {
        let service = CacheService::new(&test_config()).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"timestamp\": ").unwrap();

        let err = service.seed_from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, CacheError::Seed(ref m) if m.contains("not valid JSON")));
    }
}
