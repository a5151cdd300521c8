//! Mutation-run metrics.
//!
//! Complements the structured logging with counters and histograms for
//! dashboards that watch long-running migrations.

use metrics::{counter, describe_counter, describe_histogram, histogram};

use crate::report::{ChunkReport, RunSummary};

/// Chunks processed counter, labeled by path (`fast`/`parallel`).
pub const CHUNKS_PROCESSED: &str = "strata_chunks_processed_total";

/// Rows affected counter.
pub const ROWS_AFFECTED: &str = "strata_rows_affected_total";

/// Chunk failure counter.
pub const CHUNK_FAILURES: &str = "strata_chunk_failures_total";

/// Per-chunk pipeline duration histogram.
pub const CHUNK_DURATION: &str = "strata_chunk_duration_seconds";

/// Whole-run duration histogram.
pub const RUN_DURATION: &str = "strata_run_duration_seconds";

/// Registers all metric descriptions.
///
/// Call once at startup after installing the metrics recorder.
pub fn register_metrics() {
    describe_counter!(CHUNKS_PROCESSED, "Total chunks a mutation was attempted for");
    describe_counter!(ROWS_AFFECTED, "Total rows affected by mutation statements");
    describe_counter!(CHUNK_FAILURES, "Total chunks whose mutation step failed");
    describe_histogram!(CHUNK_DURATION, "Duration of one chunk pipeline in seconds");
    describe_histogram!(RUN_DURATION, "Duration of whole mutation runs in seconds");
}

/// Records one completed chunk.
pub fn record_chunk(path: &'static str, report: &ChunkReport) {
    let labels = [("path", path.to_string())];

    counter!(CHUNKS_PROCESSED, &labels).increment(1);
    counter!(ROWS_AFFECTED, &labels).increment(report.rows_affected);
    if !report.outcome.is_success() {
        counter!(CHUNK_FAILURES, &labels).increment(1);
    }
    histogram!(CHUNK_DURATION, &labels).record(report.duration.as_secs_f64());
}

/// Records a finished run.
pub fn record_run(summary: &RunSummary) {
    histogram!(RUN_DURATION).record(summary.elapsed.as_secs_f64());
}
