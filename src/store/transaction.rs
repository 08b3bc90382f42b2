// ABOUTME: Transaction wrapping a batch of release mutations for one group.
// ABOUTME: Complete writes a new durable snapshot; cancel replays compensations.

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::ReleaseBackend;

use super::error::StoreError;
use super::latest_snapshot;
use super::storage::{StoredRecord, VersionStorage, record_key};
use super::version::Versions;

/// A bounded sequence of mutations against one release group, with commit
/// and compensating-rollback semantics.
///
/// Lifecycle: [`Transaction::begin`] captures the start snapshot from the
/// durable store, callers record each mutation through [`versions_mut`],
/// then either [`complete`] or [`cancel`] runs exactly once. A second
/// `cancel` after a successful one is a no-op; everything else out of
/// sequence is an error.
///
/// [`versions_mut`]: Transaction::versions_mut
/// [`complete`]: Transaction::complete
/// [`cancel`]: Transaction::cancel
pub struct Transaction<B: ?Sized, S: ?Sized> {
    group: String,
    backend: Arc<B>,
    storage: Arc<S>,
    start: Option<Versions>,
    end: Option<Versions>,
    recorded: Versions,
    /// Modified entries already compensated by `cancel`, in recorded order.
    compensated: usize,
    completed: bool,
    canceled: bool,
}

impl<B, S> Transaction<B, S>
where
    B: ReleaseBackend + ?Sized,
    S: VersionStorage + ?Sized,
{
    /// Open a transaction for the group, capturing the latest stored
    /// snapshot as the start state. Fails when the store is unreachable.
    pub async fn begin(group: &str, backend: Arc<B>, storage: Arc<S>) -> Result<Self, StoreError> {
        let records = storage.list(group).await?;
        let start = latest_snapshot(&records)?;
        debug!(group, records = records.len(), "transaction started");

        Ok(Self {
            group: group.to_string(),
            backend,
            storage,
            start,
            end: None,
            recorded: Versions::new(group),
            compensated: 0,
            completed: false,
            canceled: false,
        })
    }

    /// Mutations recorded so far.
    pub fn versions(&self) -> &Versions {
        &self.recorded
    }

    /// Record mutations here as they are performed, via
    /// [`Versions::add_release_version`].
    pub fn versions_mut(&mut self) -> &mut Versions {
        &mut self.recorded
    }

    /// Snapshot captured when the transaction began, if the group had one.
    pub fn start_snapshot(&self) -> Option<&Versions> {
        self.start.as_ref()
    }

    /// Snapshot captured by `complete`.
    pub fn end_snapshot(&self) -> Option<&Versions> {
        self.end.as_ref()
    }

    /// Commit the transaction. When any mutation was recorded, the
    /// accumulated version table is written under the next snapshot revision
    /// for the group. Returns the revision written, or `None` when nothing
    /// changed.
    ///
    /// The write is an atomic compare-and-create: if a concurrent
    /// transaction took the same revision first, this fails with
    /// [`StoreError::Conflict`] instead of overwriting it.
    pub async fn complete(&mut self) -> Result<Option<u32>, StoreError> {
        if self.completed {
            return Err(StoreError::AlreadyCompleted(self.group.clone()));
        }
        if self.canceled {
            return Err(StoreError::AlreadyCanceled(self.group.clone()));
        }

        let records = self.storage.list(&self.group).await?;
        self.end = latest_snapshot(&records)?;

        if !self.recorded.modified() {
            debug!(group = %self.group, "nothing modified, no snapshot written");
            self.completed = true;
            return Ok(None);
        }

        let revision = max_revision(&records) + 1;
        let key = record_key(&self.group, revision);
        let data = serde_json::to_string(&self.recorded).map_err(StoreError::Serialize)?;

        let result = self
            .storage
            .create(
                &key,
                StoredRecord {
                    key: key.clone(),
                    revision,
                    data,
                },
            )
            .await;

        match result {
            Ok(()) => {
                info!(group = %self.group, revision, "version snapshot written");
                self.completed = true;
                Ok(Some(revision))
            }
            Err(super::error::StorageError::AlreadyExists(_)) => Err(StoreError::Conflict {
                group: self.group.clone(),
                revision,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Undo recorded mutations by replaying compensating actions in the
    /// order they were recorded: a release that did not exist before is
    /// purge-deleted, anything else is rolled back to its previous revision.
    ///
    /// Idempotent after a successful cancel. A compensation failure aborts
    /// immediately and the error names the release that needs operator
    /// attention; compensations already applied stay applied and are not
    /// replayed when `cancel` is called again.
    pub async fn cancel(&mut self) -> Result<(), StoreError> {
        if self.canceled {
            return Ok(());
        }
        if self.completed {
            return Err(StoreError::AlreadyCompleted(self.group.clone()));
        }

        let pending: Vec<_> = self
            .recorded
            .entries()
            .iter()
            .filter(|v| v.modified)
            .skip(self.compensated)
            .cloned()
            .collect();

        for version in &pending {
            let result = if version.previous_revision == 0 {
                self.backend
                    .delete(&version.release, &version.namespace, true)
                    .await
            } else {
                self.backend
                    .rollback(&version.release, &version.namespace, version.previous_revision)
                    .await
                    .map(|_| ())
            };

            match result {
                Ok(()) => {
                    self.compensated += 1;
                    info!(
                        release = %version.release,
                        previous_revision = version.previous_revision,
                        "compensation applied"
                    );
                }
                Err(source) => {
                    return Err(StoreError::CompensationFailed {
                        release: version.release.to_string(),
                        source,
                    });
                }
            }
        }

        self.canceled = true;
        Ok(())
    }
}

fn max_revision(records: &[StoredRecord]) -> u32 {
    records.iter().map(|r| r.revision).max().unwrap_or(0)
}
