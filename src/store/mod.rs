// ABOUTME: Transactional version store for rollback-capable release groups.
// ABOUTME: Exports Transaction, Version snapshots, and the durable storage trait.

mod error;
mod storage;
mod transaction;
mod version;

pub use error::{StorageError, StoreError};
pub use storage::{MemoryStorage, StoredRecord, VersionStorage, record_key};
pub use transaction::Transaction;
pub use version::{Version, Versions};

/// Decode the highest-revision snapshot among the given records.
pub fn latest_snapshot(records: &[StoredRecord]) -> Result<Option<Versions>, StoreError> {
    let Some(latest) = records.iter().max_by_key(|r| r.revision) else {
        return Ok(None);
    };

    serde_json::from_str(&latest.data)
        .map(Some)
        .map_err(|source| StoreError::CorruptSnapshot {
            key: latest.key.clone(),
            source,
        })
}

/// Load the latest stored snapshot for a group.
pub async fn latest_versions<S>(storage: &S, group: &str) -> Result<Option<Versions>, StoreError>
where
    S: VersionStorage + ?Sized,
{
    let records = storage.list(group).await?;
    latest_snapshot(&records)
}
