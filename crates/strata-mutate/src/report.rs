//! Per-chunk and per-run result types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Outcome of one chunk's mutation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The mutation statement ran to completion.
    Success,
    /// The task failed with the given reason.
    Failed(String),
}

impl TaskOutcome {
    /// Whether the task's mutation step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Result of one completed chunk task.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    /// Qualified chunk identity (or a fast-path label covering several
    /// uncompressed chunks).
    pub chunk: String,
    /// Rows affected by the mutation statement.
    pub rows_affected: u64,
    /// Wall time for the whole pipeline.
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    /// Success or failure, with reason.
    pub outcome: TaskOutcome,
}

/// Aggregate result of one orchestration run.
///
/// Only the aggregate is a stable contract; the order in which chunks
/// completed is not.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// The hypertable the run targeted.
    pub hypertable: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Chunks discovered in the snapshot.
    pub chunks_total: usize,
    /// Chunks that were compressed at snapshot time.
    pub chunks_compressed: usize,
    /// Chunks that were uncompressed at snapshot time.
    pub chunks_uncompressed: usize,
    /// Chunks a mutation statement was attempted for.
    pub chunks_processed: usize,
    /// Chunks whose mutation step failed.
    pub chunks_failed: usize,
    /// Total rows affected across all chunks.
    pub rows_affected: u64,
    /// Total wall time of the run.
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// Whether every attempted chunk succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.chunks_failed == 0
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
