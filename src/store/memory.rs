//! In-memory record store.

use crate::config::BreakerConfig;
use crate::record::BreakerRecord;
use crate::store::{RecordStore, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Transient, single-process record store backed by a map.
///
/// Last-write-wins under concurrent callers; the write lock makes
/// `find_or_create` atomic within the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, BreakerRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, name: &str) -> StoreResult<Option<BreakerRecord>> {
        Ok(self.records.read().get(name).cloned())
    }

    async fn set(&self, name: &str, record: BreakerRecord) -> StoreResult<BreakerRecord> {
        self.records
            .write()
            .insert(name.to_string(), record.clone());
        Ok(record)
    }

    async fn destroy(&self, name: &str) -> StoreResult<()> {
        self.records.write().remove(name);
        Ok(())
    }

    async fn find_or_create(
        &self,
        name: &str,
        config: BreakerConfig,
    ) -> StoreResult<BreakerRecord> {
        let mut records = self.records.write();
        let record = records
            .entry(name.to_string())
            .or_insert_with(|| BreakerRecord::new(name, config));
        Ok(record.clone())
    }
}
