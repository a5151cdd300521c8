//! The per-chunk mutation pipeline.

use std::sync::Arc;
use std::time::Instant;

use strata_catalog::Chunk;
use strata_core::SqlExecutor;

use crate::profile::MutationProfile;
use crate::report::{ChunkReport, TaskOutcome};

/// What to do with a chunk whose decompress step fails.
///
/// Decompression failure usually means "already decompressed" — another
/// process got there first, or a previous interrupted run never recompressed
/// — so the default is to attempt the mutation anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecompressFailurePolicy {
    /// Attempt the mutation regardless (default).
    #[default]
    AttemptMutation,
    /// Fail the task without mutating.
    SkipMutation,
}

/// Runs the decompress→mutate→recompress pipeline for one chunk.
pub struct ChunkMutator {
    executor: Arc<dyn SqlExecutor>,
    decompress_failure: DecompressFailurePolicy,
}

impl ChunkMutator {
    /// Creates a mutator over the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn SqlExecutor>, decompress_failure: DecompressFailurePolicy) -> Self {
        Self {
            executor,
            decompress_failure,
        }
    }

    /// Mutates one chunk and reports the outcome.
    ///
    /// Each step is independently fallible:
    ///
    /// 1. Decompress — soft failure, handled per [`DecompressFailurePolicy`].
    /// 2. Mutate, scoped to the chunk's time range — failure becomes the
    ///    task's outcome.
    /// 3. Recompress — best-effort; never changes the step-2 outcome, and
    ///    runs on every path so the chunk is not left stuck decompressed.
    pub async fn mutate(&self, chunk: &Chunk, profile: &dyn MutationProfile) -> ChunkReport {
        let started = Instant::now();
        let qualified = chunk.qualified();

        let decompress = self
            .executor
            .query(&format!("SELECT decompress_chunk('{qualified}');"))
            .await;

        if let Err(err) = decompress {
            tracing::warn!(
                chunk = %qualified,
                error = %err,
                "decompress failed; chunk may already be decompressed"
            );
            if self.decompress_failure == DecompressFailurePolicy::SkipMutation {
                self.recompress(&qualified).await;
                return ChunkReport {
                    chunk: qualified,
                    rows_affected: 0,
                    duration: started.elapsed(),
                    outcome: TaskOutcome::Failed(format!("decompress failed: {err}")),
                };
            }
        }

        let statement = profile.statement_for_range(&chunk.range_start, &chunk.range_end);
        let (rows_affected, outcome) = match self.executor.execute(&statement).await {
            Ok(result) => (result.rows_affected, TaskOutcome::Success),
            Err(err) => (0, TaskOutcome::Failed(err.to_string())),
        };

        self.recompress(&qualified).await;

        ChunkReport {
            chunk: qualified,
            rows_affected,
            duration: started.elapsed(),
            outcome,
        }
    }

    async fn recompress(&self, qualified: &str) {
        if let Err(err) = self
            .executor
            .query(&format!("SELECT compress_chunk('{qualified}');"))
            .await
        {
            tracing::warn!(
                chunk = %qualified,
                error = %err,
                "recompress failed; a later run can recompress"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use strata_test_utils::{chunk, day, ScriptedExecutor};

    use super::*;

    struct DeleteEverything;

    impl MutationProfile for DeleteEverything {
        fn describe(&self) -> String {
            "delete everything".to_string()
        }

        fn statement_for_range(&self, range_start: &str, range_end: &str) -> String {
            format!(
                "DELETE FROM t WHERE ts >= '{range_start}'::timestamptz \
                 AND ts < '{range_end}'::timestamptz"
            )
        }

        fn remaining_count_sql(&self) -> String {
            "SELECT count(*) FROM t".to_string()
        }
    }

    fn compressed_chunk() -> strata_catalog::Chunk {
        chunk(1, true, &day(1), &day(8))
    }

    #[tokio::test]
    async fn pipeline_runs_in_order() {
        let executor = Arc::new(
            ScriptedExecutor::builder()
                .on("decompress_chunk", "")
                .on("compress_chunk", "")
                .on("DELETE FROM t", "DELETE 42")
                .build(),
        );

        let mutator = ChunkMutator::new(
            Arc::clone(&executor) as Arc<dyn SqlExecutor>,
            DecompressFailurePolicy::default(),
        );
        let report = mutator.mutate(&compressed_chunk(), &DeleteEverything).await;

        assert_eq!(report.chunk, "_timescaledb_internal._hyper_1_1_chunk");
        assert_eq!(report.rows_affected, 42);
        assert!(report.outcome.is_success());

        let statements = executor.statements();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].contains("decompress_chunk"));
        assert!(statements[1].contains("DELETE FROM t"));
        assert!(statements[2].starts_with("SELECT compress_chunk"));
    }

    #[tokio::test]
    async fn mutation_failure_still_recompresses() {
        let executor = Arc::new(
            ScriptedExecutor::builder()
                .on("decompress_chunk", "")
                .on("compress_chunk", "")
                .fail_on("DELETE FROM t", "deadlock detected")
                .build(),
        );

        let mutator = ChunkMutator::new(
            Arc::clone(&executor) as Arc<dyn SqlExecutor>,
            DecompressFailurePolicy::default(),
        );
        let report = mutator.mutate(&compressed_chunk(), &DeleteEverything).await;

        assert!(!report.outcome.is_success());
        assert_eq!(report.rows_affected, 0);
        assert_eq!(executor.statements_matching("SELECT compress_chunk").len(), 1);
    }

    #[tokio::test]
    async fn decompress_failure_attempts_mutation_by_default() {
        let executor = Arc::new(
            ScriptedExecutor::builder()
                .fail_on("decompress_chunk", "chunk is not compressed")
                .on("compress_chunk", "")
                .on("DELETE FROM t", "DELETE 7")
                .build(),
        );

        let mutator = ChunkMutator::new(
            Arc::clone(&executor) as Arc<dyn SqlExecutor>,
            DecompressFailurePolicy::AttemptMutation,
        );
        let report = mutator.mutate(&compressed_chunk(), &DeleteEverything).await;

        assert!(report.outcome.is_success());
        assert_eq!(report.rows_affected, 7);
    }

    #[tokio::test]
    async fn decompress_failure_can_skip_mutation() {
        let executor = Arc::new(
            ScriptedExecutor::builder()
                .fail_on("decompress_chunk", "lock timeout")
                .on("compress_chunk", "")
                .on("DELETE FROM t", "DELETE 7")
                .build(),
        );

        let mutator = ChunkMutator::new(
            Arc::clone(&executor) as Arc<dyn SqlExecutor>,
            DecompressFailurePolicy::SkipMutation,
        );
        let report = mutator.mutate(&compressed_chunk(), &DeleteEverything).await;

        assert!(!report.outcome.is_success());
        assert!(executor.statements_matching("DELETE FROM t").is_empty());
        // The chunk must still get its recompression attempt.
        assert_eq!(executor.statements_matching("SELECT compress_chunk").len(), 1);
    }
}
