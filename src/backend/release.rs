// ABOUTME: The ReleaseBackend capability trait.
// ABOUTME: Install, upgrade, delete, rollback, render, and list operations.

use async_trait::async_trait;

use super::error::BackendError;
use super::types::{DeployableTarget, InstallOutcome, ObservedRelease};
use crate::types::{Namespace, ReleaseName};

/// Mutating and read operations against the remote release backend.
///
/// The wire protocol, rendering engine, and connection timeouts all live
/// behind this trait. The reconciliation core only decides what to call,
/// in what order.
#[async_trait]
pub trait ReleaseBackend: Send + Sync {
    /// Install a new release. With `dry_run` set, validates and renders
    /// without persisting anything.
    async fn install(
        &self,
        target: &DeployableTarget,
        dry_run: bool,
    ) -> Result<InstallOutcome, BackendError>;

    /// Upgrade an existing release. With `dry_run` set, validates and
    /// renders without persisting anything.
    async fn upgrade(
        &self,
        target: &DeployableTarget,
        dry_run: bool,
    ) -> Result<String, BackendError>;

    /// Delete a release. With `purge` set, the release history is removed
    /// as well, freeing the name for reuse.
    async fn delete(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        purge: bool,
    ) -> Result<(), BackendError>;

    /// Roll a release back to an earlier revision. Returns the new revision
    /// number the rollback was recorded under.
    async fn rollback(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        revision: u32,
    ) -> Result<u32, BackendError>;

    /// Render the manifest the target would produce, without mutating the
    /// cluster. Input to the diff pass.
    async fn render_diff_content(
        &self,
        target: &DeployableTarget,
    ) -> Result<String, BackendError>;

    /// List every release the backend currently tracks.
    async fn list_observed_releases(&self) -> Result<Vec<ObservedRelease>, BackendError>;
}
