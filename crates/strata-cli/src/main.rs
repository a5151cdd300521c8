//! strata CLI - chunk-parallel hypertable mutations.
//!
//! The main entry point for the `strata` binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing; diagnostics go to stderr so stdout stays a clean
    // progress log.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    strata_mutate::metrics::register_metrics();

    // Parse CLI arguments
    let cli = Cli::parse();
    let config = cli.config();

    // Create runtime and execute
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Commands::Chunks(args) => strata_cli::commands::chunks::execute(args, &config).await,
            Commands::Purge(args) => strata_cli::commands::purge::execute(args, &config).await,
            Commands::Remap(args) => strata_cli::commands::remap::execute(args, &config).await,
        }
    })
}
