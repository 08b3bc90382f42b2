// ABOUTME: Release backend abstraction consumed by the reconciliation core.
// ABOUTME: Defines the ReleaseBackend trait, observed-state types, and errors.

mod error;
mod memory;
mod release;
mod types;

pub use error::BackendError;
pub use memory::MemoryBackend;
pub use release::ReleaseBackend;
pub use types::{DeployableTarget, InstallOutcome, ObservedRelease, ReleaseStatus};
