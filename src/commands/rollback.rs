// ABOUTME: Rollback command: revert a release group to its prior state.
// ABOUTME: Replays the latest stored snapshot's mutations in reverse sense.

use std::sync::Arc;

use tracing::{error, info};

use crate::backend::ReleaseBackend;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::store::{Transaction, VersionStorage, latest_versions};

/// Undo the mutations recorded in the group's most recent version snapshot:
/// releases that did not exist before are purge-deleted, everything else is
/// rolled back to its previous revision. The rollback itself runs inside a
/// new transaction so it is recorded and compensable like any other run.
pub async fn run<B, S>(
    group: &str,
    backend: Arc<B>,
    storage: Arc<S>,
    mut output: Output,
) -> Result<()>
where
    B: ReleaseBackend + ?Sized,
    S: VersionStorage + ?Sized,
{
    output.start_timer();

    let snapshot = latest_versions(storage.as_ref(), group)
        .await?
        .ok_or_else(|| Error::NoStoredVersions(group.to_string()))?;

    let mut tx = Transaction::begin(group, backend.clone(), storage).await?;

    for version in snapshot.entries().iter().filter(|v| v.modified) {
        let result = if version.previous_revision == 0 {
            output.progress(&format!("deleting {} (did not exist before)", version.release));
            backend
                .delete(&version.release, &version.namespace, true)
                .await
                .map(|()| 0)
        } else {
            output.progress(&format!(
                "rolling back {} to revision {}",
                version.release, version.previous_revision
            ));
            backend
                .rollback(&version.release, &version.namespace, version.previous_revision)
                .await
        };

        match result {
            Ok(new_revision) => {
                info!(release = %version.release, new_revision, "rolled back");
                tx.versions_mut().add_release_version(
                    version.release.clone(),
                    version.namespace.clone(),
                    new_revision,
                    version.chart.clone(),
                    version.revision,
                );
            }
            Err(e) => {
                if let Err(cancel_err) = tx.cancel().await {
                    error!(error = %cancel_err, "cancel failed after rollback error");
                    output.error(&cancel_err.to_string());
                }
                return Err(e.into());
            }
        }
    }

    tx.complete().await?;
    output.success(&format!("group {} rolled back to prior state", group));
    Ok(())
}
