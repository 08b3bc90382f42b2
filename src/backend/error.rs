// ABOUTME: Error type for release backend operations.
// ABOUTME: Every variant names the release and namespace it failed against.

use thiserror::Error;

/// Errors from release backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("install of release {release} in {namespace} failed: {reason}")]
    InstallFailed {
        release: String,
        namespace: String,
        reason: String,
    },

    #[error("upgrade of release {release} in {namespace} failed: {reason}")]
    UpgradeFailed {
        release: String,
        namespace: String,
        reason: String,
    },

    #[error("delete of release {release} in {namespace} failed: {reason}")]
    DeleteFailed {
        release: String,
        namespace: String,
        reason: String,
    },

    #[error("rollback of release {release} in {namespace} to revision {revision} failed: {reason}")]
    RollbackFailed {
        release: String,
        namespace: String,
        revision: u32,
        reason: String,
    },

    #[error("rendering diff content for release {release} in {namespace} failed: {reason}")]
    RenderFailed {
        release: String,
        namespace: String,
        reason: String,
    },

    #[error("listing observed releases failed: {0}")]
    ListFailed(String),
}
