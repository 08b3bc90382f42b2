// ABOUTME: Diff command: report what an apply would change, mutating nothing.
// ABOUTME: Upgradable targets get full reports; new targets are listed as pending installs.

use crate::backend::ReleaseBackend;
use crate::config::Config;
use crate::error::Result;
use crate::output::Output;
use crate::reconcile::{TransitionState, classify};

/// Returns whether any target differs from the observed state.
pub async fn run<B>(config: &Config, backend: &B, output: &Output) -> Result<bool>
where
    B: ReleaseBackend + ?Sized,
{
    let observed = super::observed_inventory(backend).await?;
    let targets = classify(config.targets(), &observed, &[]);
    let targets = targets.diff(backend, &config.diff_options()).await?;

    let mut any_changed = false;
    for target in &targets {
        match target.state {
            TransitionState::Installable => {
                any_changed = true;
                output.progress(&format!(
                    "{} would be installed ({})",
                    target.spec.release, target.spec.chart
                ));
            }
            TransitionState::Replaceable => {
                any_changed = true;
                output.progress(&format!(
                    "{} would be replaced ({})",
                    target.spec.release, target.spec.chart
                ));
            }
            TransitionState::Upgradable if target.changed => {
                any_changed = true;
                output.report(
                    target.spec.release.as_str(),
                    &String::from_utf8_lossy(&target.diff),
                );
            }
            _ => {
                output.progress(&format!("{} is up to date", target.spec.release));
            }
        }
    }

    Ok(any_changed)
}
