//! Purge command - delete rows matching a discovered id set.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use strata_core::{PsqlExecutor, SqlExecutor};
use strata_mutate::{verify, PurgeProfile, RunOptions};

use crate::Config;

/// Arguments for the purge command.
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Target database name.
    pub database: String,

    /// Hypertable to purge rows from.
    #[arg(long, env = "STRATA_HYPERTABLE")]
    pub hypertable: String,

    /// Time column the hypertable is partitioned on.
    #[arg(long, env = "STRATA_TIME_COLUMN")]
    pub time_column: String,

    /// Column the id set applies to.
    #[arg(long)]
    pub column: String,

    /// Discovery query returning the ids to purge, one per row.
    #[arg(long = "ids-from")]
    pub ids_from: String,

    /// Concurrent chunk pipelines.
    #[arg(long, default_value_t = 2, value_parser = crate::parse_parallelism)]
    pub parallelism: usize,

    /// Fail a chunk without mutating when its decompress step fails.
    #[arg(long)]
    pub skip_on_decompress_failure: bool,
}

/// Execute the purge command.
///
/// # Errors
///
/// Returns an error when discovery fails, when the run aborts, or when
/// matching rows remain after the run.
pub async fn execute(args: PurgeArgs, config: &Config) -> Result<()> {
    let executor: Arc<dyn SqlExecutor> = Arc::new(PsqlExecutor::new(&args.database));

    let ids = discover_ids(executor.as_ref(), &args.ids_from).await?;
    if ids.is_empty() {
        println!("No matching ids; nothing to do.");
        return Ok(());
    }

    println!("Purging '{}' rows for {} ids:", args.hypertable, ids.len());
    for id in &ids {
        println!("  {id}");
    }
    println!();

    let profile = Arc::new(PurgeProfile::new(
        &args.hypertable,
        &args.time_column,
        &args.column,
        &ids,
    ));

    let pending = verify::count_remaining(executor.as_ref(), profile.as_ref())
        .await
        .context("Failed to count matching rows")?;
    println!("Rows to delete: {pending}");
    if pending == 0 {
        println!("Nothing to do.");
        return Ok(());
    }
    println!();

    let options = RunOptions::new(args.parallelism)
        .with_decompress_failure(super::decompress_policy(args.skip_on_decompress_failure));

    super::run_and_report(executor, &args.hypertable, profile, options, config).await
}

async fn discover_ids(executor: &dyn SqlExecutor, sql: &str) -> Result<Vec<String>> {
    let output = executor
        .query(sql)
        .await
        .context("Id discovery query failed")?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}
