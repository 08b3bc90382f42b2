// ABOUTME: Apply executor sequencing dry-run, diff, and real mutation passes.
// ABOUTME: Install failures are retried with cleanup; upgrades never are.

use tracing::{debug, info, warn};

use crate::backend::ReleaseBackend;
use crate::types::{ChartRef, Namespace, ReleaseName};

use super::classify::TransitionState;
use super::diff::{DiffOptions, diff_release};
use super::error::ReconcileError;
use super::retry::RetryPolicy;
use super::target::ReleaseTargets;

/// Which mutation the apply pass performed for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedAction {
    Installed,
    Upgraded,
    Replaced,
    Deleted,
}

/// One mutation the apply pass performed, with the revisions a transaction
/// needs to record it.
#[derive(Debug, Clone)]
pub struct AppliedRelease {
    pub release: ReleaseName,
    pub namespace: Namespace,
    pub chart: ChartRef,
    pub action: AppliedAction,
    /// Revision immediately before the mutation; 0 when the release did not
    /// previously exist.
    pub previous_revision: u32,
    /// Revision after the mutation; 0 after a delete.
    pub new_revision: u32,
}

/// Outcome of an apply pass. On failure the summary of mutations performed
/// so far rides along with the error so the caller can compensate.
#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub outcomes: Vec<AppliedRelease>,
    pub skipped: usize,
}

/// Result type for the apply pass: failures carry the partial summary.
pub type ApplyOutcome = Result<ApplySummary, (ApplySummary, ReconcileError)>;

impl ReleaseTargets {
    /// Validate every installable and upgradable target against the backend
    /// without mutating anything. The first failure aborts the whole run,
    /// before any durable mutation happens.
    pub async fn dry_run<B>(&self, backend: &B) -> Result<(), ReconcileError>
    where
        B: ReleaseBackend + ?Sized,
    {
        for target in self.as_slice() {
            let result = match target.state {
                // A replace starts from a clean slate, so it validates as an install.
                TransitionState::Installable | TransitionState::Replaceable => {
                    backend.install(&target.spec, true).await.map(|_| ())
                }
                TransitionState::Upgradable => {
                    backend.upgrade(&target.spec, true).await.map(|_| ())
                }
                _ => {
                    debug!(release = %target.spec.release, state = %target.state, "skipping dry run");
                    continue;
                }
            };

            result.map_err(|source| ReconcileError::DryRunFailed {
                release: target.spec.release.to_string(),
                namespace: target.spec.namespace.to_string(),
                source,
            })?;

            debug!(release = %target.spec.release, state = %target.state, "dry run passed");
        }

        Ok(())
    }

    /// Compute diffs for upgradable targets, comparing the observed release
    /// content against a freshly rendered proposal. Installable and
    /// replaceable targets have no prior content and stay marked changed.
    pub async fn diff<B>(mut self, backend: &B, opts: &DiffOptions) -> Result<Self, ReconcileError>
    where
        B: ReleaseBackend + ?Sized,
    {
        for target in self.as_mut_slice() {
            if target.state != TransitionState::Upgradable {
                continue;
            }
            let Some(observed) = target.observed.clone() else {
                continue;
            };

            let proposed = backend.render_diff_content(&target.spec).await?;
            let diff = diff_release(
                &target.spec.release,
                &target.spec.namespace,
                &observed.manifest,
                &proposed,
                &observed.values,
                &target.spec.values,
                opts,
            )?;

            debug!(release = %target.spec.release, changed = diff.changed, "diff computed");
            target.changed = diff.changed;
            target.diff = diff.report.into_bytes();
        }

        Ok(self)
    }

    /// Apply every target in input order. Mutations performed before a
    /// failure are reported back alongside the error.
    pub async fn apply<B>(&self, backend: &B, retry: &RetryPolicy) -> ApplyOutcome
    where
        B: ReleaseBackend + ?Sized,
    {
        let mut summary = ApplySummary::default();

        for target in self.as_slice() {
            let spec = &target.spec;
            match target.state {
                TransitionState::Replaceable => {
                    // A delete failure must not be followed by an install
                    // attempt against a half-deleted release.
                    if let Err(e) = backend.delete(&spec.release, &spec.namespace, true).await {
                        return Err((summary, e.into()));
                    }
                    if let Err(e) = backend.install(spec, false).await {
                        return Err((summary, e.into()));
                    }
                    info!(release = %spec.release, "release replaced");
                    summary.outcomes.push(AppliedRelease {
                        release: spec.release.clone(),
                        namespace: spec.namespace.clone(),
                        chart: spec.chart.clone(),
                        action: AppliedAction::Replaced,
                        previous_revision: target.observed_revision(),
                        new_revision: 1,
                    });
                }

                TransitionState::Installable => {
                    if let Err(e) = install_with_retry(backend, spec, retry).await {
                        return Err((summary, e));
                    }
                    info!(release = %spec.release, "release installed");
                    summary.outcomes.push(AppliedRelease {
                        release: spec.release.clone(),
                        namespace: spec.namespace.clone(),
                        chart: spec.chart.clone(),
                        action: AppliedAction::Installed,
                        previous_revision: 0,
                        new_revision: 1,
                    });
                }

                TransitionState::Upgradable => {
                    if !target.changed {
                        info!(release = %spec.release, "release unchanged, skipping upgrade");
                        summary.skipped += 1;
                        continue;
                    }
                    // Upgrades are never retried blindly: a partially applied
                    // upgrade must not be re-run against live traffic.
                    if let Err(e) = backend.upgrade(spec, false).await {
                        return Err((summary, e.into()));
                    }
                    info!(release = %spec.release, "release upgraded");
                    let previous = target.observed_revision();
                    summary.outcomes.push(AppliedRelease {
                        release: spec.release.clone(),
                        namespace: spec.namespace.clone(),
                        chart: spec.chart.clone(),
                        action: AppliedAction::Upgraded,
                        previous_revision: previous,
                        new_revision: previous + 1,
                    });
                }

                TransitionState::Deletable => {
                    if let Err(e) = backend.delete(&spec.release, &spec.namespace, true).await {
                        return Err((summary, e.into()));
                    }
                    info!(release = %spec.release, "release deleted");
                    summary.outcomes.push(AppliedRelease {
                        release: spec.release.clone(),
                        namespace: spec.namespace.clone(),
                        chart: spec.chart.clone(),
                        action: AppliedAction::Deleted,
                        previous_revision: target.observed_revision(),
                        new_revision: 0,
                    });
                }

                TransitionState::Undeleteable => {
                    warn!(
                        release = %spec.release,
                        "release was deleted but not purged; roll back its history before reinstalling"
                    );
                    summary.skipped += 1;
                }

                TransitionState::NoChange => {
                    info!(release = %spec.release, "release already converged, skipping");
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// Install with a bounded delete-then-retry loop.
///
/// The backend-side state can change between the dry-run and the real pass
/// (a concurrent actor may already have created the release), so each failed
/// attempt deletes the partial release before trying again. A cleanup
/// failure is fatal; so is exhausting the attempts.
async fn install_with_retry<B>(
    backend: &B,
    spec: &crate::backend::DeployableTarget,
    retry: &RetryPolicy,
) -> Result<(), ReconcileError>
where
    B: ReleaseBackend + ?Sized,
{
    let mut attempt = 1;
    loop {
        match backend.install(spec, false).await {
            Ok(_) => return Ok(()),
            Err(source) => {
                if attempt >= retry.max_attempts {
                    return Err(ReconcileError::RetriesExhausted {
                        release: spec.release.to_string(),
                        attempts: attempt,
                        source,
                    });
                }

                warn!(
                    release = %spec.release,
                    attempt,
                    error = %source,
                    "install failed, deleting partial release before retry"
                );
                backend.delete(&spec.release, &spec.namespace, true).await?;

                if !retry.backoff.is_zero() {
                    tokio::time::sleep(retry.backoff).await;
                }
                attempt += 1;
            }
        }
    }
}
