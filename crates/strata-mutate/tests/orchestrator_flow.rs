//! End-to-end orchestration flows against the scripted executor.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use strata_catalog::CatalogError;
use strata_mutate::{
    verify, ChunkReport, Error, Orchestrator, ProgressObserver, PurgeProfile, RunOptions,
};
use strata_test_utils::{catalog_rows, chunk, day, init_test_logging, ScriptedExecutor};

/// Observer that records every callback for later assertions.
#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<(usize, usize, ChunkReport)>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<(usize, usize, ChunkReport)> {
        self.events.lock().expect("observer lock").clone()
    }
}

impl ProgressObserver for RecordingObserver {
    fn chunk_complete(&self, completed: usize, total: usize, report: &ChunkReport) {
        self.events
            .lock()
            .expect("observer lock")
            .push((completed, total, report.clone()));
    }
}

fn purge_profile() -> Arc<PurgeProfile> {
    Arc::new(PurgeProfile::new(
        "fixes",
        "received_at",
        "aircraft_id",
        &["dead-beef".to_string()],
    ))
}

#[tokio::test]
async fn full_run_converges() {
    init_test_logging();

    // Two compressed chunks holding 4 and 6 matching rows, one uncompressed
    // chunk holding none.
    let snapshot = [
        chunk(1, true, &day(1), &day(8)),
        chunk(2, true, &day(8), &day(15)),
        chunk(3, false, &day(15), &day(22)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .on("decompress_chunk", "")
            .on("compress_chunk", "")
            .on(">= '2025-06-01", "DELETE 4")
            .on(">= '2025-06-08", "DELETE 6")
            .on(">= '2025-06-15", "DELETE 0")
            .on("SELECT count(*)", "0")
            .build(),
    );

    let profile = purge_profile();
    let orchestrator = Orchestrator::new(executor.clone());
    let summary = orchestrator
        .run("fixes", profile.clone(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.rows_affected, 10);
    assert_eq!(summary.chunks_processed, 3);
    assert_eq!(summary.chunks_failed, 0);
    assert!(summary.is_clean());

    let remaining = verify::count_remaining(executor.as_ref(), profile.as_ref())
        .await
        .expect("verification count");
    assert_eq!(remaining, 0);

    // The uncompressed chunk is mutated first and never decompressed.
    let statements = executor.statements();
    assert!(statements[1].contains(">= '2025-06-15"));
    let decompressed = executor.statements_matching("decompress_chunk");
    assert_eq!(decompressed.len(), 2);
    assert!(decompressed.iter().all(|sql| !sql.contains("_hyper_1_3_chunk")));
}

#[tokio::test]
async fn empty_catalog_is_a_clean_noop() {
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", "")
            .build(),
    );

    let summary = Orchestrator::new(executor.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.chunks_total, 0);
    assert_eq!(summary.rows_affected, 0);
    assert!(summary.is_clean());
    // The catalog query is the only statement ever issued.
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn one_failing_chunk_does_not_stop_the_others() {
    let snapshot = [
        chunk(1, true, &day(1), &day(8)),
        chunk(2, true, &day(8), &day(15)),
        chunk(3, true, &day(15), &day(22)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .on("decompress_chunk", "")
            .on("compress_chunk", "")
            .fail_on(">= '2025-06-08", "deadlock detected")
            .on("DELETE FROM fixes", "DELETE 5")
            .build(),
    );

    let observer = Arc::new(RecordingObserver::default());
    let summary = Orchestrator::new(executor.clone())
        .with_observer(observer.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.chunks_processed, 3);
    assert_eq!(summary.chunks_failed, 1);
    assert_eq!(summary.rows_affected, 10);

    let events = observer.events();
    assert_eq!(events.len(), 3);
    let failures: Vec<_> = events
        .iter()
        .filter(|(_, _, report)| !report.outcome.is_success())
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].2.chunk.contains("_hyper_1_2_chunk"));

    // Every chunk, the failed one included, gets its recompression attempt.
    assert_eq!(executor.statements_matching("SELECT compress_chunk").len(), 3);
}

#[tokio::test]
async fn second_run_affects_nothing() {
    let snapshot = [
        chunk(1, true, &day(1), &day(8)),
        chunk(2, true, &day(8), &day(15)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .on("decompress_chunk", "")
            .on("compress_chunk", "")
            .on_seq(">= '2025-06-01", ["DELETE 4", "DELETE 0"])
            .on_seq(">= '2025-06-08", ["DELETE 6", "DELETE 0"])
            .on("SELECT count(*)", "0")
            .build(),
    );

    let profile = purge_profile();
    let orchestrator = Orchestrator::new(executor.clone());

    let first = orchestrator
        .run("fixes", profile.clone(), RunOptions::new(2))
        .await
        .expect("first run");
    assert_eq!(first.rows_affected, 10);

    let second = orchestrator
        .run("fixes", profile.clone(), RunOptions::new(2))
        .await
        .expect("second run");
    assert_eq!(second.rows_affected, 0);
    assert_eq!(second.chunks_failed, 0);

    let remaining = verify::count_remaining(executor.as_ref(), profile.as_ref())
        .await
        .expect("verification count");
    assert_eq!(remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn parallelism_bounds_inflight_mutations() {
    let snapshot = [
        chunk(1, true, &day(1), &day(8)),
        chunk(2, true, &day(8), &day(15)),
        chunk(3, true, &day(15), &day(22)),
        chunk(4, true, &day(22), &day(29)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .execute_delay(Duration::from_millis(50))
            .build(),
    );

    let summary = Orchestrator::new(executor.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.chunks_processed, 4);
    assert_eq!(executor.max_concurrent_executions(), 2);
}

#[tokio::test]
async fn contiguous_uncompressed_chunks_take_one_statement() {
    let snapshot = [
        chunk(1, false, &day(1), &day(8)),
        chunk(2, false, &day(8), &day(15)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .on("DELETE FROM fixes", "DELETE 9")
            .build(),
    );

    let observer = Arc::new(RecordingObserver::default());
    let summary = Orchestrator::new(executor.clone())
        .with_observer(observer.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.chunks_processed, 2);
    assert_eq!(summary.rows_affected, 9);

    let deletes = executor.statements_matching("DELETE FROM fixes");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].contains(">= '2025-06-01"));
    assert!(deletes[0].contains("< '2025-06-15"));

    // One union statement, one progress callback, two chunks accounted for.
    let events = observer.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, 2);
}

#[tokio::test]
async fn gapped_uncompressed_chunks_take_separate_statements() {
    let snapshot = [
        chunk(1, false, &day(1), &day(8)),
        chunk(2, false, &day(15), &day(22)),
    ];
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .on("timescaledb_information.chunks", catalog_rows(&snapshot))
            .on(">= '2025-06-01", "DELETE 2")
            .on(">= '2025-06-15", "DELETE 3")
            .build(),
    );

    let summary = Orchestrator::new(executor.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect("run");

    assert_eq!(summary.chunks_processed, 2);
    assert_eq!(summary.rows_affected, 5);

    let deletes = executor.statements_matching("DELETE FROM fixes");
    assert_eq!(deletes.len(), 2);
    // Neither statement may span the gap between the two chunks.
    assert!(deletes[0].contains("< '2025-06-08"));
    assert!(deletes[1].contains(">= '2025-06-15"));
}

#[tokio::test]
async fn catalog_failure_aborts_before_any_mutation() {
    let executor = Arc::new(
        ScriptedExecutor::builder()
            .fail_on("timescaledb_information.chunks", "connection refused")
            .build(),
    );

    let err = Orchestrator::new(executor.clone())
        .run("fixes", purge_profile(), RunOptions::new(2))
        .await
        .expect_err("must abort");

    assert!(matches!(err, Error::Catalog(CatalogError::Unavailable { .. })));
    assert_eq!(executor.statements().len(), 1);
}

#[tokio::test]
async fn zero_parallelism_is_rejected() {
    let executor = Arc::new(ScriptedExecutor::builder().build());

    let err = Orchestrator::new(executor.clone())
        .run("fixes", purge_profile(), RunOptions::new(0))
        .await
        .expect_err("must reject");

    assert!(matches!(err, Error::InvalidParallelism));
    assert!(executor.statements().is_empty());
}
