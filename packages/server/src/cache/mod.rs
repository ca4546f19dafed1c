//! Short-lived key/value storage for verification codes.

mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryCache;
pub use redis::RedisCache;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// String cache with per-key expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, expiring after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch a live value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove `key` if present.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
