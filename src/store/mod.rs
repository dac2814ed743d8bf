//! Record store trait and backends.

use crate::config::BreakerConfig;
use crate::record::BreakerRecord;
use async_trait::async_trait;
use thiserror::Error;

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Redis-specific error.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Record could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend connection failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Generic backend error.
    #[error("Store error: {0}")]
    Other(String),
}

/// Keyed persistence of one [`BreakerRecord`] per breaker name.
///
/// The breaker engine depends only on this trait; transient and durable
/// backends are substitutable without engine changes. No ordering or
/// indexing guarantees beyond per-name lookup.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the record for `name`. A missing key is `Ok(None)`, never an
    /// error.
    async fn get(&self, name: &str) -> StoreResult<Option<BreakerRecord>>;

    /// Upsert the record for `name` and return the stored value. Safe to
    /// call repeatedly with the same name.
    async fn set(&self, name: &str, record: BreakerRecord) -> StoreResult<BreakerRecord>;

    /// Remove the record for `name`. Succeeds silently when absent.
    async fn destroy(&self, name: &str) -> StoreResult<()>;

    /// Return the existing record for `name`, or atomically create a zeroed
    /// one bound to `config`. Backends must never produce two records for
    /// the same name under concurrent callers.
    async fn find_or_create(
        &self,
        name: &str,
        config: BreakerConfig,
    ) -> StoreResult<BreakerRecord>;
}
