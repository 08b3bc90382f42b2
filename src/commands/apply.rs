// ABOUTME: Apply command: reconcile desired targets against the cluster.
// ABOUTME: Wraps the mutating passes in a transaction with cancel-on-failure.

use std::sync::Arc;

use tracing::error;

use crate::backend::ReleaseBackend;
use crate::config::Config;
use crate::error::Result;
use crate::output::Output;
use crate::reconcile::{ApplySummary, classify};
use crate::store::{Transaction, VersionStorage};

/// Options for the apply command.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Names force-targeted for replacement (release, chart, or chart
    /// metadata names).
    pub force: Vec<String>,
    /// Stop after the dry-run and diff passes without mutating anything.
    pub dry_run: bool,
}

pub async fn run<B, S>(
    config: &Config,
    backend: Arc<B>,
    storage: Arc<S>,
    opts: &ApplyOptions,
    mut output: Output,
) -> Result<ApplySummary>
where
    B: ReleaseBackend + ?Sized,
    S: VersionStorage + ?Sized,
{
    output.start_timer();

    let observed = super::observed_inventory(backend.as_ref()).await?;
    let targets = classify(config.targets(), &observed, &opts.force);

    output.progress(&format!("validating {} targets", targets.len()));
    targets.dry_run(backend.as_ref()).await?;

    let targets = targets.diff(backend.as_ref(), &config.diff_options()).await?;
    for target in &targets {
        if target.changed && !target.diff.is_empty() {
            output.report(
                target.spec.release.as_str(),
                &String::from_utf8_lossy(&target.diff),
            );
        }
    }

    if opts.dry_run {
        output.success("dry run complete, no changes applied");
        return Ok(ApplySummary::default());
    }

    let mut tx = Transaction::begin(&config.group, backend.clone(), storage).await?;

    match targets.apply(backend.as_ref(), &config.retry_policy()).await {
        Ok(summary) => {
            record(&mut tx, &summary);
            tx.complete().await?;
            output.success(&format!(
                "applied {} changes ({} skipped)",
                summary.outcomes.len(),
                summary.skipped
            ));
            Ok(summary)
        }
        Err((partial, apply_err)) => {
            // Compensate whatever already ran before the failure.
            record(&mut tx, &partial);
            if let Err(cancel_err) = tx.cancel().await {
                error!(error = %cancel_err, "cancel failed after apply error");
                output.error(&cancel_err.to_string());
            }
            Err(apply_err.into())
        }
    }
}

fn record<B, S>(tx: &mut Transaction<B, S>, summary: &ApplySummary)
where
    B: ReleaseBackend + ?Sized,
    S: VersionStorage + ?Sized,
{
    for outcome in &summary.outcomes {
        tx.versions_mut().add_release_version(
            outcome.release.clone(),
            outcome.namespace.clone(),
            outcome.new_revision,
            outcome.chart.clone(),
            outcome.previous_revision,
        );
    }
}
