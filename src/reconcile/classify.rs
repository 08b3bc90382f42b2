// ABOUTME: Target classifier assigning each desired target a transition state.
// ABOUTME: Pure function of desired targets, observed inventory, and force names.

use std::collections::HashMap;
use std::fmt;

use crate::backend::{DeployableTarget, ObservedRelease, ReleaseStatus};
use crate::types::ReleaseName;

use super::target::{ReleaseTarget, ReleaseTargets};

/// The mutating operation a desired target requires. Assigned only by
/// [`classify`]; the apply executor never reassigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    /// Target matches the observed release and nothing needs to happen.
    NoChange,
    /// No observed release shares the release name; a fresh install.
    Installable,
    /// Observed release exists and can be upgraded in place.
    Upgradable,
    /// Observed release is force-targeted or failed; delete then install.
    Replaceable,
    /// Target is marked for removal.
    Deletable,
    /// Observed release was deleted but not purged; the name is blocked
    /// until the release history is rolled back or purged.
    Undeleteable,
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitionState::NoChange => "no-change",
            TransitionState::Installable => "installable",
            TransitionState::Upgradable => "upgradable",
            TransitionState::Replaceable => "replaceable",
            TransitionState::Deletable => "deletable",
            TransitionState::Undeleteable => "undeleteable",
        };
        write!(f, "{}", s)
    }
}

/// Assign a transition state to every desired target.
///
/// Total and deterministic: every target receives exactly one state, and no
/// I/O happens here. `force_names` matches against the release name, the
/// chart package name, and the chart's declared metadata name.
pub fn classify(
    desired: Vec<DeployableTarget>,
    observed: &HashMap<ReleaseName, ObservedRelease>,
    force_names: &[String],
) -> ReleaseTargets {
    let targets = desired
        .into_iter()
        .map(|spec| {
            let matched = observed.get(&spec.release);
            let state = state_for(&spec, matched, force_names);
            ReleaseTarget::new(spec, state, matched.cloned())
        })
        .collect();

    ReleaseTargets::new(targets)
}

fn state_for(
    spec: &DeployableTarget,
    matched: Option<&ObservedRelease>,
    force_names: &[String],
) -> TransitionState {
    let Some(release) = matched else {
        return TransitionState::Installable;
    };

    if is_forced(spec, force_names) || release.status == ReleaseStatus::Failed {
        return TransitionState::Replaceable;
    }

    if release.status == ReleaseStatus::Uninstalled {
        return TransitionState::Undeleteable;
    }

    TransitionState::Upgradable
}

fn is_forced(spec: &DeployableTarget, force_names: &[String]) -> bool {
    force_names.iter().any(|name| {
        name == spec.release.as_str()
            || name == spec.chart.name()
            || spec.metadata_name.as_deref() == Some(name.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChartRef, Namespace};

    fn target(release: &str, chart: &str) -> DeployableTarget {
        DeployableTarget {
            release: ReleaseName::new(release).unwrap(),
            namespace: Namespace::default(),
            chart: ChartRef::parse(chart).unwrap(),
            metadata_name: None,
            values: String::new(),
        }
    }

    fn release(name: &str, status: ReleaseStatus) -> ObservedRelease {
        ObservedRelease {
            chart: ChartRef::parse("stable/minio").unwrap(),
            name: ReleaseName::new(name).unwrap(),
            namespace: Namespace::default(),
            status,
            revision: 1,
            values: String::new(),
            manifest: String::new(),
        }
    }

    fn observed(releases: Vec<ObservedRelease>) -> HashMap<ReleaseName, ObservedRelease> {
        releases.into_iter().map(|r| (r.name.clone(), r)).collect()
    }

    #[test]
    fn unmatched_target_is_installable() {
        let targets = classify(
            vec![target("storage-minio", "stable/minio")],
            &HashMap::new(),
            &[],
        );
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Installable);
    }

    #[test]
    fn matched_deployed_target_is_upgradable() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Deployed)]);
        let targets = classify(vec![target("storage-minio", "stable/minio")], &obs, &[]);
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Upgradable);
    }

    #[test]
    fn failed_release_is_replaceable_without_force() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Failed)]);
        let targets = classify(vec![target("storage-minio", "stable/minio")], &obs, &[]);
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Replaceable);
    }

    #[test]
    fn force_by_release_name() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Deployed)]);
        let targets = classify(
            vec![target("storage-minio", "stable/minio")],
            &obs,
            &["storage-minio".to_string()],
        );
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Replaceable);
    }

    #[test]
    fn force_by_chart_name() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Deployed)]);
        let targets = classify(
            vec![target("storage-minio", "stable/minio")],
            &obs,
            &["minio".to_string()],
        );
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Replaceable);
    }

    #[test]
    fn force_by_metadata_name() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Deployed)]);
        let mut spec = target("storage-minio", "stable/minio");
        spec.metadata_name = Some("object-store".to_string());
        let targets = classify(vec![spec], &obs, &["object-store".to_string()]);
        assert_eq!(targets.iter().next().unwrap().state, TransitionState::Replaceable);
    }

    #[test]
    fn uninstalled_release_is_undeleteable() {
        let obs = observed(vec![release("storage-minio", ReleaseStatus::Uninstalled)]);
        let targets = classify(vec![target("storage-minio", "stable/minio")], &obs, &[]);
        assert_eq!(
            targets.iter().next().unwrap().state,
            TransitionState::Undeleteable
        );
    }

    #[test]
    fn every_target_gets_exactly_one_state() {
        let obs = observed(vec![
            release("a", ReleaseStatus::Deployed),
            release("b", ReleaseStatus::Failed),
        ]);
        let targets = classify(
            vec![target("a", "charts/a"), target("b", "charts/b"), target("c", "charts/c")],
            &obs,
            &[],
        );
        let states: Vec<_> = targets.iter().map(|t| t.state).collect();
        assert_eq!(
            states,
            vec![
                TransitionState::Upgradable,
                TransitionState::Replaceable,
                TransitionState::Installable,
            ]
        );
    }
}
