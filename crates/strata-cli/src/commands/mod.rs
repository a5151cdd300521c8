//! CLI command implementations.

pub mod chunks;
pub mod purge;
pub mod remap;

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use strata_core::SqlExecutor;
use strata_mutate::{
    verify, DecompressFailurePolicy, MutationProfile, Orchestrator, RunOptions,
};

use crate::observer::StdoutObserver;
use crate::{Config, OutputFormat};

pub(crate) fn decompress_policy(skip: bool) -> DecompressFailurePolicy {
    if skip {
        DecompressFailurePolicy::SkipMutation
    } else {
        DecompressFailurePolicy::AttemptMutation
    }
}

/// Runs the orchestration, verifies convergence, and reports the result.
///
/// Exits non-zero (via error) only when the run could not start or when
/// matching rows remain after it: failed chunks alone do not fail the
/// process as long as verification shows convergence.
pub(crate) async fn run_and_report(
    executor: Arc<dyn SqlExecutor>,
    hypertable: &str,
    profile: Arc<dyn MutationProfile>,
    options: RunOptions,
    config: &Config,
) -> Result<()> {
    let orchestrator =
        Orchestrator::new(Arc::clone(&executor)).with_observer(Arc::new(StdoutObserver));

    let summary = orchestrator
        .run(hypertable, Arc::clone(&profile), options)
        .await
        .context("Mutation run aborted")?;

    let remaining = verify::count_remaining(executor.as_ref(), profile.as_ref())
        .await
        .context("Failed to verify convergence")?;

    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "summary": summary,
                    "remaining": remaining,
                }))
                .context("Failed to serialize summary")?
            );
        }
        OutputFormat::Text => {
            println!();
            println!("Summary:");
            println!(
                "  Chunks processed: {}/{}",
                summary.chunks_processed, summary.chunks_total
            );
            println!("  Chunks failed:    {}", summary.chunks_failed);
            println!("  Rows affected:    {}", summary.rows_affected);
            println!("  Elapsed:          {:.1}s", summary.elapsed.as_secs_f64());
            println!("  Remaining rows:   {remaining}");
        }
    }

    if remaining > 0 {
        println!();
        println!("{remaining} matching rows remain; this run is safe to repeat.");
        bail!("incomplete: {remaining} matching rows remain");
    }

    println!();
    if summary.is_clean() {
        println!("All chunks processed; the mutation has converged.");
    } else {
        println!(
            "{} chunks reported failures, but no matching rows remain.",
            summary.chunks_failed
        );
    }
    Ok(())
}
