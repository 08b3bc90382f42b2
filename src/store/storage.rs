// ABOUTME: Durable storage trait for version snapshots, plus the in-memory driver.
// ABOUTME: Creation is atomic compare-and-create; existing keys are conflicts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::StorageError;

/// One durable record: a serialized version snapshot under a revisioned key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub key: String,
    /// Snapshot revision for the group; monotonically increasing.
    pub revision: u32,
    /// Serialized `Versions` table.
    pub data: String,
}

/// Storage key for a group snapshot revision.
pub fn record_key(group: &str, revision: u32) -> String {
    format!("{}/v{}", group, revision)
}

/// Keyed, append-oriented durable record store.
///
/// The store itself (cluster-hosted key/value objects, a database, a
/// directory of files) is an external collaborator; this trait is the
/// read/list/create contract the transaction layer requires.
#[async_trait]
pub trait VersionStorage: Send + Sync {
    /// All records stored for the group, in no particular order.
    async fn list(&self, group: &str) -> Result<Vec<StoredRecord>, StorageError>;

    /// Atomically create a record. Fails with [`StorageError::AlreadyExists`]
    /// when the key is taken; never overwrites.
    async fn create(&self, key: &str, record: StoredRecord) -> Result<(), StorageError>;
}

/// In-process storage driver backing local runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<BTreeMap<String, StoredRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionStorage for MemoryStorage {
    async fn list(&self, group: &str) -> Result<Vec<StoredRecord>, StorageError> {
        let prefix = format!("{}/", group);
        let records = self.records.lock();
        Ok(records
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn create(&self, key: &str, record: StoredRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock();
        if records.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        records.insert(key.to_string(), record);
        Ok(())
    }
}
