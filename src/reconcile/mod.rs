// ABOUTME: Reconciliation core: classify desired targets, diff inventories, apply changes.
// ABOUTME: Exports the classifier, differ, apply executor, and retry policy.

mod apply;
mod classify;
mod diff;
mod error;
mod retry;
mod target;

pub use apply::{AppliedAction, AppliedRelease, ApplyOutcome, ApplySummary};
pub use classify::{TransitionState, classify};
pub use diff::{DiffOptions, ReleaseDiff, diff_manifests, diff_release};
pub use error::ReconcileError;
pub use retry::RetryPolicy;
pub use target::{ReleaseTarget, ReleaseTargets};
