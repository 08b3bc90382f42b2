// ABOUTME: Error types for the version store and its durable storage driver.
// ABOUTME: Transaction-state misuse is an error, never a panic.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors from the durable record storage driver.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend could not be reached.
    #[error("version storage unreachable: {0}")]
    Unreachable(String),

    /// A record with this key already exists. Creation is atomic
    /// compare-and-create, so this signals a concurrent writer.
    #[error("record {0} already exists")]
    AlreadyExists(String),

    /// Writing a record failed for a reason other than a key conflict.
    #[error("failed to write record {key}: {reason}")]
    WriteFailed { key: String, reason: String },
}

/// Errors from transaction operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction for group {0} has already been completed")]
    AlreadyCompleted(String),

    #[error("transaction for group {0} has already been canceled")]
    AlreadyCanceled(String),

    /// Another transaction wrote a version for this group between our start
    /// snapshot and completion. The caller should re-read and re-run.
    #[error("version {revision} for group {group} was written concurrently; re-run to reconcile")]
    Conflict { group: String, revision: u32 },

    /// A compensating action failed during cancel. Compensations already
    /// applied are not rolled back; the named release needs operator
    /// attention.
    #[error("compensation for release {release} failed: {source}")]
    CompensationFailed {
        release: String,
        #[source]
        source: BackendError,
    },

    /// A stored snapshot could not be decoded.
    #[error("stored snapshot {key} is corrupt: {source}")]
    CorruptSnapshot {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot could not be encoded for storage.
    #[error("failed to serialize version snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
