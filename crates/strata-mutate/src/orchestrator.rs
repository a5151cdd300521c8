//! Run-level orchestration: classify, fast path, bounded worker pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use strata_catalog::{Chunk, ChunkCatalog};
use strata_core::SqlExecutor;

use crate::error::{Error, Result};
use crate::metrics;
use crate::mutator::{ChunkMutator, DecompressFailurePolicy};
use crate::profile::MutationProfile;
use crate::report::{ChunkReport, RunSummary, TaskOutcome};

/// Receives one callback per completed chunk, in completion order.
///
/// Progress reporting is decoupled from aggregation: the orchestrator's
/// totals never depend on what an observer does.
pub trait ProgressObserver: Send + Sync {
    /// Called after each chunk completes. `completed` counts chunks done so
    /// far out of `total` discovered.
    fn chunk_complete(&self, completed: usize, total: usize, report: &ChunkReport);
}

/// Observer that discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn chunk_complete(&self, _completed: usize, _total: usize, _report: &ChunkReport) {}
}

/// Options for one orchestration run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Maximum concurrently in-flight chunk pipelines. Must be at least 1.
    pub parallelism: usize,
    /// Policy for chunks whose decompress step fails.
    pub decompress_failure: DecompressFailurePolicy,
}

impl RunOptions {
    /// Creates options with the given parallelism and default policies.
    #[must_use]
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism,
            decompress_failure: DecompressFailurePolicy::default(),
        }
    }

    /// Overrides the decompress-failure policy.
    #[must_use]
    pub const fn with_decompress_failure(mut self, policy: DecompressFailurePolicy) -> Self {
        self.decompress_failure = policy;
        self
    }
}

/// Drives a mutation profile across every chunk of a hypertable.
pub struct Orchestrator {
    executor: Arc<dyn SqlExecutor>,
    observer: Arc<dyn ProgressObserver>,
}

impl Orchestrator {
    /// Creates an orchestrator with no progress observer.
    #[must_use]
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            executor,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attaches a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs `profile` across every chunk of `hypertable`.
    ///
    /// Uncompressed chunks are mutated directly (fast path, always first);
    /// compressed chunks go through decompress→mutate→recompress pipelines
    /// with at most `parallelism` in flight. One chunk's failure never
    /// cancels or blocks the others; the failure set is reported in the
    /// summary and the caller re-runs until verification shows convergence.
    ///
    /// Chunk processing order across the pool is unspecified; only the
    /// aggregate summary is a stable contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParallelism`] for a zero pool size and
    /// [`Error::Catalog`] when chunk discovery fails; in both cases no
    /// mutation statement has been issued.
    pub async fn run(
        &self,
        hypertable: &str,
        profile: Arc<dyn MutationProfile>,
        options: RunOptions,
    ) -> Result<RunSummary> {
        if options.parallelism == 0 {
            return Err(Error::InvalidParallelism);
        }

        let started_at = Utc::now();
        let timer = Instant::now();

        let catalog = ChunkCatalog::new(Arc::clone(&self.executor));
        let chunks = catalog.list_chunks(hypertable).await?;
        let (compressed, uncompressed): (Vec<Chunk>, Vec<Chunk>) =
            chunks.into_iter().partition(|chunk| chunk.compressed);

        let mut summary = RunSummary {
            hypertable: hypertable.to_string(),
            started_at,
            chunks_total: compressed.len() + uncompressed.len(),
            chunks_compressed: compressed.len(),
            chunks_uncompressed: uncompressed.len(),
            chunks_processed: 0,
            chunks_failed: 0,
            rows_affected: 0,
            elapsed: Duration::ZERO,
        };

        if summary.chunks_total == 0 {
            tracing::info!(hypertable, "no chunks found; nothing to do");
            summary.elapsed = timer.elapsed();
            return Ok(summary);
        }

        tracing::info!(
            hypertable,
            total = summary.chunks_total,
            compressed = summary.chunks_compressed,
            uncompressed = summary.chunks_uncompressed,
            parallelism = options.parallelism,
            operation = %profile.describe(),
            "starting mutation run"
        );

        if !uncompressed.is_empty() {
            self.run_fast_path(hypertable, &uncompressed, profile.as_ref(), &mut summary)
                .await;
        }

        if !compressed.is_empty() {
            self.run_parallel_path(compressed, Arc::clone(&profile), options, &mut summary)
                .await;
        }

        summary.elapsed = timer.elapsed();
        metrics::record_run(&summary);
        tracing::info!(
            hypertable,
            rows_affected = summary.rows_affected,
            chunks_processed = summary.chunks_processed,
            chunks_failed = summary.chunks_failed,
            "mutation run finished"
        );
        Ok(summary)
    }

    /// Mutates uncompressed chunks directly, no decompress/recompress.
    ///
    /// A contiguous run of two or more chunks takes a single statement over
    /// the union range. Non-contiguous chunks take one statement each — a
    /// gap in the union could belong to a compressed chunk.
    async fn run_fast_path(
        &self,
        hypertable: &str,
        uncompressed: &[Chunk],
        profile: &dyn MutationProfile,
        summary: &mut RunSummary,
    ) {
        let contiguous = uncompressed.windows(2).all(|pair| pair[0].abuts(&pair[1]));

        if uncompressed.len() > 1 && contiguous {
            let first = &uncompressed[0];
            let last = &uncompressed[uncompressed.len() - 1];
            let label = format!("{hypertable} ({} uncompressed chunks)", uncompressed.len());
            let report = self
                .direct_mutation(
                    label,
                    profile.statement_for_range(&first.range_start, &last.range_end),
                )
                .await;
            Self::absorb(summary, &report, uncompressed.len());
            metrics::record_chunk("fast", &report);
            self.observer
                .chunk_complete(summary.chunks_processed, summary.chunks_total, &report);
        } else {
            for chunk in uncompressed {
                let report = self
                    .direct_mutation(
                        chunk.qualified(),
                        profile.statement_for_range(&chunk.range_start, &chunk.range_end),
                    )
                    .await;
                Self::absorb(summary, &report, 1);
                metrics::record_chunk("fast", &report);
                self.observer
                    .chunk_complete(summary.chunks_processed, summary.chunks_total, &report);
            }
        }
    }

    async fn direct_mutation(&self, label: String, statement: String) -> ChunkReport {
        let started = Instant::now();
        match self.executor.execute(&statement).await {
            Ok(outcome) => ChunkReport {
                chunk: label,
                rows_affected: outcome.rows_affected,
                duration: started.elapsed(),
                outcome: TaskOutcome::Success,
            },
            Err(err) => ChunkReport {
                chunk: label,
                rows_affected: 0,
                duration: started.elapsed(),
                outcome: TaskOutcome::Failed(err.to_string()),
            },
        }
    }

    /// Drives the bounded worker pool over compressed chunks.
    async fn run_parallel_path(
        &self,
        compressed: Vec<Chunk>,
        profile: Arc<dyn MutationProfile>,
        options: RunOptions,
        summary: &mut RunSummary,
    ) {
        let semaphore = Arc::new(Semaphore::new(options.parallelism));
        let mutator = Arc::new(ChunkMutator::new(
            Arc::clone(&self.executor),
            options.decompress_failure,
        ));

        let mut tasks = JoinSet::new();
        for chunk in compressed {
            let semaphore = Arc::clone(&semaphore);
            let mutator = Arc::clone(&mutator);
            let profile = Arc::clone(&profile);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("worker pool semaphore is never closed");
                mutator.mutate(&chunk, profile.as_ref()).await
            });
        }

        // Collect in completion order, not submission order.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => {
                    Self::absorb(summary, &report, 1);
                    metrics::record_chunk("parallel", &report);
                    self.observer
                        .chunk_complete(summary.chunks_processed, summary.chunks_total, &report);
                }
                Err(err) => {
                    summary.chunks_failed += 1;
                    tracing::error!(error = %err, "chunk task failed to join");
                }
            }
        }
    }

    fn absorb(summary: &mut RunSummary, report: &ChunkReport, weight: usize) {
        summary.chunks_processed += weight;
        summary.rows_affected += report.rows_affected;
        if !report.outcome.is_success() {
            summary.chunks_failed += weight;
        }
    }
}
