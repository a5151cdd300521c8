//! Remap command - rewrite an id column through a mapping table.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use strata_core::{PsqlExecutor, SqlExecutor};
use strata_mutate::{RemapProfile, RunOptions};

use crate::Config;

/// Arguments for the remap command.
#[derive(Debug, Args)]
pub struct RemapArgs {
    /// Target database name.
    pub database: String,

    /// Hypertable whose rows to remap.
    #[arg(long, env = "STRATA_HYPERTABLE")]
    pub hypertable: String,

    /// Time column the hypertable is partitioned on.
    #[arg(long, env = "STRATA_TIME_COLUMN")]
    pub time_column: String,

    /// Id column to rewrite.
    #[arg(long)]
    pub column: String,

    /// Mapping table holding old and new ids.
    #[arg(long)]
    pub mapping: String,

    /// Mapping column with the ids to replace.
    #[arg(long)]
    pub from_column: String,

    /// Mapping column with the replacement ids.
    #[arg(long)]
    pub to_column: String,

    /// Concurrent chunk pipelines.
    #[arg(long, default_value_t = 4, value_parser = crate::parse_parallelism)]
    pub parallelism: usize,

    /// Fail a chunk without mutating when its decompress step fails.
    #[arg(long)]
    pub skip_on_decompress_failure: bool,
}

/// Execute the remap command.
///
/// # Errors
///
/// Returns an error when the mapping table is missing, when the run aborts,
/// or when matching rows remain after the run.
pub async fn execute(args: RemapArgs, config: &Config) -> Result<()> {
    let executor: Arc<dyn SqlExecutor> = Arc::new(PsqlExecutor::new(&args.database));

    // The mapping table must exist before anything is touched.
    let exists = executor
        .query(&format!(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_name = '{}')",
            args.mapping
        ))
        .await
        .context("Failed to check for the mapping table")?;
    if exists != "t" {
        bail!(
            "mapping table '{}' not found in '{}'",
            args.mapping,
            args.database
        );
    }

    let mapped = executor
        .query(&format!("SELECT count(*) FROM {}", args.mapping))
        .await
        .context("Failed to count mapping rows")?;
    println!("Ids to remap: {mapped}");
    println!();

    let profile = Arc::new(RemapProfile::new(
        &args.hypertable,
        &args.time_column,
        &args.column,
        &args.mapping,
        &args.from_column,
        &args.to_column,
    ));

    let options = RunOptions::new(args.parallelism)
        .with_decompress_failure(super::decompress_policy(args.skip_on_decompress_failure));

    super::run_and_report(executor, &args.hypertable, profile, options, config).await
}
