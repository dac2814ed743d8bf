//! Redis-backed record store.

use crate::config::BreakerConfig;
use crate::record::BreakerRecord;
use crate::store::{RecordStore, StoreError, StoreResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

const DEFAULT_KEY_PREFIX: &str = "breaker";

/// Durable record store keeping one JSON-encoded record per breaker name.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connect to Redis at `url` using the default key prefix.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use circuit_guard::RedisStore;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), circuit_guard::StoreError> {
    ///     let store = RedisStore::connect("redis://localhost:6379").await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(url: &str) -> StoreResult<Self> {
        Self::connect_with_prefix(url, DEFAULT_KEY_PREFIX).await
    }

    /// Connect to Redis with a custom key prefix, for namespacing multiple
    /// deployments against one instance.
    pub async fn connect_with_prefix(url: &str, prefix: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            connection,
            key_prefix: prefix.to_string(),
        })
    }

    fn build_key(&self, name: &str) -> String {
        format!("{}:{}", self.key_prefix, name)
    }

    fn encode(record: &BreakerRecord) -> StoreResult<String> {
        serde_json::to_string(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(json: &str) -> StoreResult<BreakerRecord> {
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn get(&self, name: &str) -> StoreResult<Option<BreakerRecord>> {
        let key = self.build_key(name);
        let mut conn = self.connection.clone();

        let value: Option<String> = conn.get(&key).await?;
        value.as_deref().map(Self::decode).transpose()
    }

    async fn set(&self, name: &str, record: BreakerRecord) -> StoreResult<BreakerRecord> {
        let key = self.build_key(name);
        let mut conn = self.connection.clone();

        let json = Self::encode(&record)?;
        let _: () = conn.set(&key, json).await?;
        Ok(record)
    }

    async fn destroy(&self, name: &str) -> StoreResult<()> {
        let key = self.build_key(name);
        let mut conn = self.connection.clone();

        let _: () = conn.del(&key).await?;
        Ok(())
    }

    async fn find_or_create(
        &self,
        name: &str,
        config: BreakerConfig,
    ) -> StoreResult<BreakerRecord> {
        let key = self.build_key(name);
        let mut conn = self.connection.clone();

        // SET NX creates the zeroed record only if the key is absent, so
        // concurrent callers can never produce two records for one name.
        // The read-back returns whichever record won.
        let zeroed = Self::encode(&BreakerRecord::new(name, config))?;
        let _: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&zeroed)
            .arg("NX")
            .query_async(&mut conn)
            .await?;

        let value: Option<String> = conn.get(&key).await?;
        match value {
            Some(json) => Self::decode(&json),
            None => Err(StoreError::Other(format!(
                "record for {name} vanished between create and read"
            ))),
        }
    }
}
