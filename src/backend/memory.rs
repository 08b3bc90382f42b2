// ABOUTME: In-process release backend for local experimentation.
// ABOUTME: Tracks releases in a map and renders a trivial deterministic manifest.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::{Namespace, ReleaseName};

use super::error::BackendError;
use super::release::ReleaseBackend;
use super::types::{DeployableTarget, InstallOutcome, ObservedRelease, ReleaseStatus};

/// Release backend holding all state in memory.
///
/// Stands in for a real cluster connector: useful for trying the CLI end to
/// end and as a deterministic fixture. Rendering produces a single ConfigMap
/// per release carrying the chart reference and values.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    releases: Mutex<HashMap<ReleaseName, ObservedRelease>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an observed release, e.g. to simulate pre-existing cluster state.
    pub fn seed(&self, release: ObservedRelease) {
        self.releases.lock().insert(release.name.clone(), release);
    }

    fn render(target: &DeployableTarget) -> String {
        let values_block = if target.values.is_empty() {
            String::new()
        } else {
            let indented: String = target
                .values
                .lines()
                .map(|l| format!("    {}\n", l))
                .collect();
            format!("  values: |\n{}", indented)
        };

        format!(
            "---\napiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\n  namespace: {}\ndata:\n  chart: {}\n{}",
            target.release, target.namespace, target.chart, values_block
        )
    }
}

#[async_trait]
impl ReleaseBackend for MemoryBackend {
    async fn install(
        &self,
        target: &DeployableTarget,
        dry_run: bool,
    ) -> Result<InstallOutcome, BackendError> {
        let mut releases = self.releases.lock();

        // Dry run validates rendering only; a replace frees the name between
        // validation and the real install, so existence is not checked here.
        if !dry_run {
            if let Some(existing) = releases.get(&target.release) {
                if existing.status != ReleaseStatus::Uninstalled {
                    return Err(BackendError::InstallFailed {
                        release: target.release.to_string(),
                        namespace: target.namespace.to_string(),
                        reason: "release already exists".to_string(),
                    });
                }
            }

            releases.insert(
                target.release.clone(),
                ObservedRelease {
                    chart: target.chart.clone(),
                    name: target.release.clone(),
                    namespace: target.namespace.clone(),
                    status: ReleaseStatus::Deployed,
                    revision: 1,
                    values: target.values.clone(),
                    manifest: Self::render(target),
                },
            );
        }

        Ok(InstallOutcome {
            release: target.release.clone(),
            message: format!("installed {}", target.chart),
        })
    }

    async fn upgrade(
        &self,
        target: &DeployableTarget,
        dry_run: bool,
    ) -> Result<String, BackendError> {
        let mut releases = self.releases.lock();

        let Some(existing) = releases.get_mut(&target.release) else {
            return Err(BackendError::UpgradeFailed {
                release: target.release.to_string(),
                namespace: target.namespace.to_string(),
                reason: "release not found".to_string(),
            });
        };

        if !dry_run {
            existing.chart = target.chart.clone();
            existing.revision += 1;
            existing.status = ReleaseStatus::Deployed;
            existing.values = target.values.clone();
            existing.manifest = Self::render(target);
        }

        Ok(format!("upgraded to {}", target.chart))
    }

    async fn delete(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        purge: bool,
    ) -> Result<(), BackendError> {
        let mut releases = self.releases.lock();

        if purge {
            releases
                .remove(release)
                .map(|_| ())
                .ok_or_else(|| BackendError::DeleteFailed {
                    release: release.to_string(),
                    namespace: namespace.to_string(),
                    reason: "release not found".to_string(),
                })
        } else {
            match releases.get_mut(release) {
                Some(existing) => {
                    existing.status = ReleaseStatus::Uninstalled;
                    Ok(())
                }
                None => Err(BackendError::DeleteFailed {
                    release: release.to_string(),
                    namespace: namespace.to_string(),
                    reason: "release not found".to_string(),
                }),
            }
        }
    }

    async fn rollback(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        revision: u32,
    ) -> Result<u32, BackendError> {
        let mut releases = self.releases.lock();

        let Some(existing) = releases.get_mut(release) else {
            return Err(BackendError::RollbackFailed {
                release: release.to_string(),
                namespace: namespace.to_string(),
                revision,
                reason: "release not found".to_string(),
            });
        };

        // A rollback is recorded as a fresh revision, like the real backend.
        existing.revision += 1;
        existing.status = ReleaseStatus::Deployed;
        Ok(existing.revision)
    }

    async fn render_diff_content(
        &self,
        target: &DeployableTarget,
    ) -> Result<String, BackendError> {
        Ok(Self::render(target))
    }

    async fn list_observed_releases(&self) -> Result<Vec<ObservedRelease>, BackendError> {
        Ok(self.releases.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChartRef;

    fn target(name: &str) -> DeployableTarget {
        DeployableTarget {
            release: ReleaseName::new(name).unwrap(),
            namespace: Namespace::default(),
            chart: ChartRef::parse("stable/minio").unwrap(),
            metadata_name: None,
            values: String::new(),
        }
    }

    #[tokio::test]
    async fn dry_run_install_leaves_no_state() {
        let backend = MemoryBackend::new();
        backend.install(&target("storage-minio"), true).await.unwrap();
        assert!(backend.list_observed_releases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn install_then_upgrade_bumps_revision() {
        let backend = MemoryBackend::new();
        backend.install(&target("storage-minio"), false).await.unwrap();
        backend.upgrade(&target("storage-minio"), false).await.unwrap();

        let releases = backend.list_observed_releases().await.unwrap();
        assert_eq!(releases[0].revision, 2);
    }

    #[tokio::test]
    async fn double_install_fails() {
        let backend = MemoryBackend::new();
        backend.install(&target("storage-minio"), false).await.unwrap();
        assert!(backend.install(&target("storage-minio"), false).await.is_err());
    }

    #[tokio::test]
    async fn unpurged_delete_leaves_uninstalled_entry() {
        let backend = MemoryBackend::new();
        let t = target("storage-minio");
        backend.install(&t, false).await.unwrap();
        backend
            .delete(&t.release, &t.namespace, false)
            .await
            .unwrap();

        let releases = backend.list_observed_releases().await.unwrap();
        assert_eq!(releases[0].status, ReleaseStatus::Uninstalled);
    }
}
