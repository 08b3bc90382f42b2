// ABOUTME: Shared types crossing the backend boundary.
// ABOUTME: Desired targets going in, observed releases and outcomes coming back.

use crate::types::{ChartRef, Namespace, ReleaseName};

/// One desired deployable unit, as produced by the config layer.
#[derive(Debug, Clone)]
pub struct DeployableTarget {
    /// Release name the unit deploys under.
    pub release: ReleaseName,
    /// Namespace the release lives in.
    pub namespace: Namespace,
    /// Chart package to deploy.
    pub chart: ChartRef,
    /// Name declared in the chart's own metadata, when known. Used only for
    /// force-replace matching.
    pub metadata_name: Option<String>,
    /// Raw values override text passed through to the backend.
    pub values: String,
}

/// Status the backend reports for a deployed release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStatus {
    /// Release is live.
    Deployed,
    /// Last operation on the release failed.
    Failed,
    /// Release was deleted but its history was not purged.
    Uninstalled,
    /// Release was replaced by a newer revision.
    Superseded,
    /// Backend reported a status this core does not model.
    Unknown,
}

/// A release as observed in the running cluster. Read-only to the core.
#[derive(Debug, Clone)]
pub struct ObservedRelease {
    pub chart: ChartRef,
    pub name: ReleaseName,
    pub namespace: Namespace,
    pub status: ReleaseStatus,
    pub revision: u32,
    /// Raw values the release was last deployed with.
    pub values: String,
    /// Rendered manifest text of the deployed revision. Supplied up front so
    /// the diff pass needs no second backend round-trip.
    pub manifest: String,
}

/// Result of a successful install.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub release: ReleaseName,
    pub message: String,
}
