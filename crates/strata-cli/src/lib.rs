//! # strata-cli
//!
//! Command-line interface for chunk-parallel hypertable mutations.
//!
//! ## Commands
//!
//! - `strata chunks` - List a hypertable's chunks with compression state
//! - `strata purge` - Delete rows matching a discovered id set, chunk by chunk
//! - `strata remap` - Rewrite an id column through a mapping table, chunk by chunk
//!
//! ## Exit status
//!
//! Mutation commands exit zero only when post-run verification finds no
//! remaining matching rows. Interrupted or partially failed runs exit
//! non-zero and are safe to repeat until they converge.
//!
//! ## Configuration
//!
//! Frequently repeated flags can come from the environment:
//!
//! - `STRATA_HYPERTABLE` - Target hypertable name
//! - `STRATA_TIME_COLUMN` - Time column the hypertable is partitioned on

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

pub mod commands;
pub mod observer;

use clap::{Parser, Subcommand, ValueEnum};

/// strata - chunk-parallel mutation of time-partitioned hypertables.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Builds the shared command configuration from global flags.
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            format: self.format,
        }
    }
}

/// Shared configuration derived from global flags.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Output format for command results.
    pub format: OutputFormat,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the chunks of a hypertable with compression state.
    Chunks(commands::chunks::ChunksArgs),
    /// Delete rows matching a discovered id set, chunk by chunk.
    Purge(commands::purge::PurgeArgs),
    /// Rewrite an id column through a mapping table, chunk by chunk.
    Remap(commands::remap::RemapArgs),
}

/// Parses and validates a worker-pool size.
fn parse_parallelism(value: &str) -> Result<usize, String> {
    let parsed: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if parsed == 0 {
        return Err("parallelism must be at least 1".to_string());
    }
    Ok(parsed)
}
