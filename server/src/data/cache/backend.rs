//! Cache backend trait definition

use async_trait::async_trait;

use super::error::CacheError;

/// Storage the dashboard datasets live in
///
/// Single-key reads and writes are atomic. Nothing groups several keys into
/// one transaction, so a reader fetching many keys while the refresh job is
/// writing them can see a mix of old and new values.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Raw bytes stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store `value` under `key` without expiry; the refresh job overwrites it
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    async fn health_check(&self) -> Result<(), CacheError>;

    /// Backend name for logs, the banner and the health endpoint
    fn backend_name(&self) -> &'static str;
}
