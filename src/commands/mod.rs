// ABOUTME: Command handlers behind the CLI surface.
// ABOUTME: Generic over backend and storage so tests drive them with doubles.

pub mod apply;
pub mod diff;
pub mod rollback;

use std::collections::HashMap;

use crate::backend::{ObservedRelease, ReleaseBackend};
use crate::error::Result;
use crate::types::ReleaseName;

/// Fetch the observed release inventory keyed by release name.
pub(crate) async fn observed_inventory<B>(
    backend: &B,
) -> Result<HashMap<ReleaseName, ObservedRelease>>
where
    B: ReleaseBackend + ?Sized,
{
    let releases = backend.list_observed_releases().await?;
    Ok(releases.into_iter().map(|r| (r.name.clone(), r)).collect())
}
