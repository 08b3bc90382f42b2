// ABOUTME: End-to-end reconciliation scenarios through the command layer.
// ABOUTME: Drives apply, diff, and rollback against in-process backend and storage.

mod support;

use std::sync::Arc;

use flotilla::backend::{MemoryBackend, ReleaseBackend, ReleaseStatus};
use flotilla::commands::apply::{self, ApplyOptions};
use flotilla::commands::{diff, rollback};
use flotilla::config::Config;
use flotilla::output::{Output, OutputMode};
use flotilla::reconcile::{AppliedAction, TransitionState, classify};
use flotilla::store::{MemoryStorage, latest_versions};

fn config() -> Config {
    Config::from_yaml(
        r#"
group: openstack-storage
releases:
  - name: storage-minio
    chart: stable/minio:1.2.3
    values: |
      replicas: 1
retry:
  max_attempts: 3
  backoff: 0s
"#,
    )
    .unwrap()
}

fn output() -> Output {
    Output::new(OutputMode::Quiet)
}

#[tokio::test]
async fn fresh_install_records_a_snapshot() {
    let config = config();
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    let summary = apply::run(
        &config,
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].action, AppliedAction::Installed);

    let releases = backend.list_observed_releases().await.unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].status, ReleaseStatus::Deployed);
    assert_eq!(releases[0].revision, 1);

    let snapshot = latest_versions(storage.as_ref(), "openstack-storage")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.entries().len(), 1);
    assert_eq!(snapshot.entries()[0].revision, 1);
    assert_eq!(snapshot.entries()[0].previous_revision, 0);
}

#[tokio::test]
async fn converged_group_applies_nothing() {
    let config = config();
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    apply::run(
        &config,
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    // Second run: identical desired state renders an identical manifest.
    let summary = apply::run(
        &config,
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        backend.list_observed_releases().await.unwrap()[0].revision,
        1
    );
}

#[tokio::test]
async fn changed_values_upgrade_in_place() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    apply::run(
        &config(),
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    let mut scaled = config();
    scaled.releases[0].values = Some("replicas: 3\n".to_string());

    let changed = diff::run(&scaled, backend.as_ref(), &output()).await.unwrap();
    assert!(changed);

    let summary = apply::run(
        &scaled,
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].action, AppliedAction::Upgraded);
    assert_eq!(summary.outcomes[0].previous_revision, 1);
    assert_eq!(summary.outcomes[0].new_revision, 2);
    assert_eq!(
        backend.list_observed_releases().await.unwrap()[0].revision,
        2
    );
}

#[tokio::test]
async fn dry_run_apply_mutates_nothing() {
    let config = config();
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    let summary = apply::run(
        &config,
        backend.clone(),
        storage.clone(),
        &ApplyOptions {
            force: Vec::new(),
            dry_run: true,
        },
        output(),
    )
    .await
    .unwrap();

    assert!(summary.outcomes.is_empty());
    assert!(backend.list_observed_releases().await.unwrap().is_empty());
    assert!(
        latest_versions(storage.as_ref(), "openstack-storage")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn force_replaces_a_deployed_release() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    apply::run(
        &config(),
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    let summary = apply::run(
        &config(),
        backend.clone(),
        storage.clone(),
        &ApplyOptions {
            force: vec!["storage-minio".to_string()],
            dry_run: false,
        },
        output(),
    )
    .await
    .unwrap();

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].action, AppliedAction::Replaced);
    // Replace starts release history over.
    assert_eq!(
        backend.list_observed_releases().await.unwrap()[0].revision,
        1
    );
}

#[tokio::test]
async fn added_manifest_document_reports_and_upgrades_once() {
    const EXTRA_SERVICE: &str = "\
---
apiVersion: v1
kind: Service
metadata:
  name: storage-minio
  namespace: default
spec:
  type: ClusterIP
";

    let config = config();
    let backend = Arc::new(support::MockBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    backend.seed(support::deployed(
        "storage-minio",
        2,
        support::BASE_MANIFEST,
        "replicas: 1\n",
    ));
    backend.set_rendered(
        "storage-minio",
        &format!("{}{}", support::BASE_MANIFEST, EXTRA_SERVICE),
    );

    // The proposal renders one more document than the observed release.
    let observed = support::inventory(backend.list_observed_releases().await.unwrap());
    let targets = classify(config.targets(), &observed, &[]);
    let targets = targets
        .diff(backend.as_ref(), &config.diff_options())
        .await
        .unwrap();

    let target = targets.iter().next().unwrap();
    assert_eq!(target.state, TransitionState::Upgradable);
    assert!(target.changed);
    assert!(
        String::from_utf8_lossy(&target.diff)
            .contains("default#storage-minio#Service# has been added")
    );

    let summary = apply::run(
        &config,
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].action, AppliedAction::Upgraded);
    assert_eq!(summary.outcomes[0].previous_revision, 2);
    assert_eq!(summary.outcomes[0].new_revision, 3);
    assert_eq!(backend.upgrades(false), 1);
    assert_eq!(backend.installs(false), 0);
    assert_eq!(backend.deletes(), 0);
}

#[tokio::test]
async fn rollback_undoes_the_last_recorded_run() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    apply::run(
        &config(),
        backend.clone(),
        storage.clone(),
        &ApplyOptions::default(),
        output(),
    )
    .await
    .unwrap();

    // The install had no prior revision, so rolling the group back deletes it.
    rollback::run("openstack-storage", backend.clone(), storage.clone(), output())
        .await
        .unwrap();

    assert!(backend.list_observed_releases().await.unwrap().is_empty());
}

#[tokio::test]
async fn rollback_without_history_is_an_error() {
    let backend = Arc::new(MemoryBackend::new());
    let storage = Arc::new(MemoryStorage::new());

    let err = rollback::run("openstack-storage", backend, storage, output())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("openstack-storage"));
}
