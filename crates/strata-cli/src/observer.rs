//! Stdout progress reporting.

use strata_mutate::{ChunkReport, ProgressObserver, TaskOutcome};

/// Prints one progress line per completed chunk.
///
/// Failures additionally go to standard error through tracing, so a piped
/// stdout stays a clean progress log.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutObserver;

impl ProgressObserver for StdoutObserver {
    fn chunk_complete(&self, completed: usize, total: usize, report: &ChunkReport) {
        let name = short_name(&report.chunk);
        match &report.outcome {
            TaskOutcome::Success => println!(
                "  [{completed}/{total}] {name}: {} rows ({:.1}s)",
                report.rows_affected,
                report.duration.as_secs_f64()
            ),
            TaskOutcome::Failed(reason) => {
                println!(
                    "  [{completed}/{total}] {name}: FAILED ({:.1}s)",
                    report.duration.as_secs_f64()
                );
                tracing::error!(chunk = %report.chunk, %reason, "chunk mutation failed");
            }
        }
    }
}

fn short_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}
