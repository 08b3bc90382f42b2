// ABOUTME: Error types for reconciliation operations.
// ABOUTME: Covers dry-run, diff, and apply failures with release context.

use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur while reconciling release targets.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A backend operation failed. The backend error already carries the
    /// release name and namespace.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A manifest sub-document could not be parsed far enough to extract
    /// its identity fields.
    #[error("failed to parse manifest document for release {release}: {source}")]
    ManifestParse {
        release: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A manifest sub-document is missing a required identity field.
    #[error("manifest document for release {release} has no {field}")]
    MissingField {
        release: String,
        field: &'static str,
    },

    /// Dry-run validation failed before any mutation was attempted.
    #[error("dry run for release {release} in {namespace} failed: {source}")]
    DryRunFailed {
        release: String,
        namespace: String,
        #[source]
        source: BackendError,
    },

    /// Install attempts were exhausted.
    #[error("install of release {release} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        release: String,
        attempts: u32,
        #[source]
        source: BackendError,
    },
}
