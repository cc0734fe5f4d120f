//! Key-value cache used for domain -> tenant lookups
//!
//! The domain subsystem only needs get/set/del with a TTL. Two backends:
//! - [`MemoryCache`]: per-process, for single-instance and development setups
//! - [`RedisCache`]: shared across instances, so invalidation is seen by all of them

mod memory;
mod redis;

use async_trait::async_trait;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

/// TTL key-value storage
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Get the value for `key`, `None` if missing or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl_secs` seconds
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;

    /// Remove `key`
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// Errors returned by a cache backend
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}
