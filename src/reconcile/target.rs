// ABOUTME: ReleaseTarget carries per-target state between the reconciliation passes.
// ABOUTME: ReleaseTargets wraps the ordered list the passes run over.

use crate::backend::{DeployableTarget, ObservedRelease};

use super::classify::TransitionState;

/// One deployable unit for the duration of a reconciliation run.
///
/// Created by the classifier, enriched by the diff pass, consumed by the
/// apply pass, then discarded.
#[derive(Debug, Clone)]
pub struct ReleaseTarget {
    /// The desired state of the release.
    pub spec: DeployableTarget,
    /// Which mutating operation this target requires.
    pub state: TransitionState,
    /// The matching observed release, when one exists.
    pub observed: Option<ObservedRelease>,
    /// Human-readable diff report from the diff pass.
    pub diff: Vec<u8>,
    /// Whether the target differs from the observed release. Targets with no
    /// prior content to compare against are always considered changed.
    pub changed: bool,
}

impl ReleaseTarget {
    pub(crate) fn new(
        spec: DeployableTarget,
        state: TransitionState,
        observed: Option<ObservedRelease>,
    ) -> Self {
        Self {
            spec,
            state,
            observed,
            diff: Vec::new(),
            // The diff pass refines this for upgradable targets only.
            changed: true,
        }
    }

    /// Revision of the matching observed release, or 0 when the release
    /// does not exist yet. This is what transactions record as the
    /// previous revision.
    pub fn observed_revision(&self) -> u32 {
        self.observed.as_ref().map(|r| r.revision).unwrap_or(0)
    }
}

/// Ordered list of release targets for one reconciliation run.
///
/// Order is significant: the dry-run, diff, and apply passes all walk
/// targets in input order.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTargets(Vec<ReleaseTarget>);

impl ReleaseTargets {
    pub(crate) fn new(targets: Vec<ReleaseTarget>) -> Self {
        Self(targets)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReleaseTarget> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_slice(&self) -> &[ReleaseTarget] {
        &self.0
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [ReleaseTarget] {
        &mut self.0
    }
}

impl IntoIterator for ReleaseTargets {
    type Item = ReleaseTarget;
    type IntoIter = std::vec::IntoIter<ReleaseTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReleaseTargets {
    type Item = &'a ReleaseTarget;
    type IntoIter = std::slice::Iter<'a, ReleaseTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
