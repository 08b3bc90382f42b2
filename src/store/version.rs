// ABOUTME: Version and Versions: point-in-time release revision snapshots.
// ABOUTME: Serializes to a flat JSON table for durable storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ChartRef, Namespace, ReleaseName};

/// One release revision record inside a snapshot. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub release: ReleaseName,
    pub namespace: Namespace,
    pub revision: u32,
    pub chart: ChartRef,
    /// Revision immediately before the mutation that produced this entry;
    /// 0 when the release did not previously exist.
    pub previous_revision: u32,
    /// Whether this entry records a mutation (as opposed to carried-over
    /// state from the start snapshot).
    pub modified: bool,
}

/// A named, ordered collection of version entries: one point-in-time
/// snapshot of a release group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Versions {
    /// Release-group identifier the snapshot belongs to.
    pub name: String,
    pub created_at: DateTime<Utc>,
    entries: Vec<Version>,
}

impl Versions {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Record one mutated release. Entries keep insertion order; cancel
    /// compensates in exactly this order.
    pub fn add_release_version(
        &mut self,
        release: ReleaseName,
        namespace: Namespace,
        revision: u32,
        chart: ChartRef,
        previous_revision: u32,
    ) {
        self.entries.push(Version {
            release,
            namespace,
            revision,
            chart,
            previous_revision,
            modified: true,
        });
    }

    pub fn entries(&self) -> &[Version] {
        &self.entries
    }

    /// Whether any entry records a mutation. Transactions that modified
    /// nothing write no durable snapshot.
    pub fn modified(&self) -> bool {
        self.entries.iter().any(|v| v.modified)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
