//! Chunks command - inspect a hypertable's chunk snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use strata_catalog::ChunkCatalog;
use strata_core::PsqlExecutor;

use crate::{Config, OutputFormat};

/// Arguments for the chunks command.
#[derive(Debug, Args)]
pub struct ChunksArgs {
    /// Target database name.
    pub database: String,

    /// Hypertable whose chunks to list.
    #[arg(long, env = "STRATA_HYPERTABLE")]
    pub hypertable: String,
}

/// Execute the chunks command.
///
/// # Errors
///
/// Returns an error when the chunk catalog cannot be queried.
pub async fn execute(args: ChunksArgs, config: &Config) -> Result<()> {
    let executor = Arc::new(PsqlExecutor::new(&args.database));
    let catalog = ChunkCatalog::new(executor);
    let chunks = catalog
        .list_chunks(&args.hypertable)
        .await
        .context("Failed to list chunks")?;

    match config.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&chunks).context("Failed to serialize chunks")?
            );
        }
        OutputFormat::Text => {
            if chunks.is_empty() {
                println!("No chunks found for '{}'", args.hypertable);
                return Ok(());
            }
            let compressed = chunks.iter().filter(|c| c.compressed).count();
            println!(
                "Chunks of '{}' ({} total, {} compressed):",
                args.hypertable,
                chunks.len(),
                compressed
            );
            println!();
            for chunk in &chunks {
                let state = if chunk.compressed {
                    "compressed"
                } else {
                    "uncompressed"
                };
                println!(
                    "  {:<44} {:<12} [{} .. {})",
                    chunk.qualified(),
                    state,
                    chunk.range_start,
                    chunk.range_end
                );
            }
        }
    }

    Ok(())
}
