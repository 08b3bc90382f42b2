// ABOUTME: Shared test doubles and fixture builders for the integration suite.
// ABOUTME: MockBackend records every backend call and fails on script.

#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use flotilla::backend::{
    BackendError, DeployableTarget, InstallOutcome, ObservedRelease, ReleaseBackend, ReleaseStatus,
};
use flotilla::types::{ChartRef, Namespace, ReleaseName};
use parking_lot::Mutex;

/// One recorded backend call, in the order the backend received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Install { release: String, dry_run: bool },
    Upgrade { release: String, dry_run: bool },
    Delete { release: String, purge: bool },
    Rollback { release: String, revision: u32 },
}

/// Scriptable [`ReleaseBackend`] double.
///
/// Every call is recorded. Failures are scripted per release with a bounded
/// count, so a test can make the first two installs fail and the third
/// succeed.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    releases: Mutex<Vec<ObservedRelease>>,
    rendered: Mutex<HashMap<String, String>>,
    install_failures: Mutex<HashMap<String, u32>>,
    upgrade_failures: Mutex<HashMap<String, u32>>,
    delete_failures: Mutex<HashMap<String, u32>>,
    rollback_failures: Mutex<HashMap<String, u32>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, release: ObservedRelease) {
        self.releases.lock().push(release);
    }

    /// Manifest `render_diff_content` returns for the release.
    pub fn set_rendered(&self, release: &str, manifest: &str) {
        self.rendered
            .lock()
            .insert(release.to_string(), manifest.to_string());
    }

    /// Make the next `count` non-dry-run installs of the release fail.
    pub fn fail_installs(&self, release: &str, count: u32) {
        self.install_failures
            .lock()
            .insert(release.to_string(), count);
    }

    pub fn fail_upgrades(&self, release: &str, count: u32) {
        self.upgrade_failures
            .lock()
            .insert(release.to_string(), count);
    }

    pub fn fail_deletes(&self, release: &str, count: u32) {
        self.delete_failures
            .lock()
            .insert(release.to_string(), count);
    }

    pub fn fail_rollbacks(&self, release: &str, count: u32) {
        self.rollback_failures
            .lock()
            .insert(release.to_string(), count);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn installs(&self, dry_run: bool) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Install { dry_run: d, .. } if *d == dry_run))
            .count()
    }

    pub fn upgrades(&self, dry_run: bool) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Upgrade { dry_run: d, .. } if *d == dry_run))
            .count()
    }

    pub fn deletes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete { .. }))
            .count()
    }

    pub fn rollbacks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Rollback { .. }))
            .count()
    }

    fn should_fail(map: &Mutex<HashMap<String, u32>>, release: &str) -> bool {
        let mut map = map.lock();
        match map.get_mut(release) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ReleaseBackend for MockBackend {
    async fn install(
        &self,
        target: &DeployableTarget,
        dry_run: bool,
    ) -> Result<InstallOutcome, BackendError> {
        self.calls.lock().push(Call::Install {
            release: target.release.to_string(),
            dry_run,
        });

        if !dry_run && Self::should_fail(&self.install_failures, target.release.as_str()) {
            return Err(BackendError::InstallFailed {
                release: target.release.to_string(),
                namespace: target.namespace.to_string(),
                reason: "scripted failure".to_string(),
            });
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
        self.calls.lock().push(Call::Upgrade {
            release: target.release.to_string(),
            dry_run,
        });

        if !dry_run && Self::should_fail(&self.upgrade_failures, target.release.as_str()) {
            return Err(BackendError::UpgradeFailed {
                release: target.release.to_string(),
                namespace: target.namespace.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        Ok(format!("upgraded to {}", target.chart))
    }

    async fn delete(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        purge: bool,
    ) -> Result<(), BackendError> {
        self.calls.lock().push(Call::Delete {
            release: release.to_string(),
            purge,
        });

        if Self::should_fail(&self.delete_failures, release.as_str()) {
            return Err(BackendError::DeleteFailed {
                release: release.to_string(),
                namespace: namespace.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        Ok(())
    }

    async fn rollback(
        &self,
        release: &ReleaseName,
        namespace: &Namespace,
        revision: u32,
    ) -> Result<u32, BackendError> {
        self.calls.lock().push(Call::Rollback {
            release: release.to_string(),
            revision,
        });

        if Self::should_fail(&self.rollback_failures, release.as_str()) {
            return Err(BackendError::RollbackFailed {
                release: release.to_string(),
                namespace: namespace.to_string(),
                revision,
                reason: "scripted failure".to_string(),
            });
        }

        Ok(revision + 1)
    }

    async fn render_diff_content(
        &self,
        target: &DeployableTarget,
    ) -> Result<String, BackendError> {
        Ok(self
            .rendered
            .lock()
            .get(target.release.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_observed_releases(&self) -> Result<Vec<ObservedRelease>, BackendError> {
        Ok(self.releases.lock().clone())
    }
}

pub fn target(release: &str, chart: &str) -> DeployableTarget {
    DeployableTarget {
        release: ReleaseName::new(release).unwrap(),
        namespace: Namespace::default(),
        chart: ChartRef::parse(chart).unwrap(),
        metadata_name: None,
        values: String::new(),
    }
}

pub fn deployed(name: &str, revision: u32, manifest: &str, values: &str) -> ObservedRelease {
    observed(name, ReleaseStatus::Deployed, revision, manifest, values)
}

pub fn observed(
    name: &str,
    status: ReleaseStatus,
    revision: u32,
    manifest: &str,
    values: &str,
) -> ObservedRelease {
    ObservedRelease {
        chart: ChartRef::parse("stable/minio:1.2.3").unwrap(),
        name: ReleaseName::new(name).unwrap(),
        namespace: Namespace::default(),
        status,
        revision,
        values: values.to_string(),
        manifest: manifest.to_string(),
    }
}

/// Map a list of observed releases by name, as the classifier consumes them.
pub fn inventory(
    releases: Vec<ObservedRelease>,
) -> std::collections::HashMap<ReleaseName, ObservedRelease> {
    releases.into_iter().map(|r| (r.name.clone(), r)).collect()
}

/// A small two-document manifest used across the suite.
pub const BASE_MANIFEST: &str = "\
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: storage-minio
  namespace: default
data:
  replicas: \"1\"
";
