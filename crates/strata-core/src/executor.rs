//! SQL executor boundary.
//!
//! Everything strata does against the target database goes through the
//! [`SqlExecutor`] trait: tuples-only queries for discovery and verification,
//! and mutating statements whose affected-row count is read back from the
//! command tag. The production implementation, [`PsqlExecutor`], shells out
//! to `psql` so the tool needs no driver-level connection handling and
//! inherits the operator's connection service configuration.

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::rowcount::parse_affected_rows;

/// Outcome of a mutating statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// The trailing command tag reported by the database (e.g. `DELETE 42`).
    pub command_tag: String,
    /// Affected-row count parsed from the command tag; `0` when absent.
    pub rows_affected: u64,
}

/// Boundary to the target database.
///
/// Implementations must be safe to call concurrently; the orchestrator shares
/// one executor across all in-flight chunk pipelines.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a query and returns its tuples-only output, trimmed.
    ///
    /// Tabular results arrive as one line per row with `|`-separated columns
    /// (see [`split_rows`]). An empty result set is an empty string, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the statement fails and
    /// [`Error::Spawn`] when the client cannot be launched.
    async fn query(&self, sql: &str) -> Result<String>;

    /// Runs a mutating statement and returns its [`MutationOutcome`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Execution`] when the statement fails and
    /// [`Error::Spawn`] when the client cannot be launched.
    async fn execute(&self, sql: &str) -> Result<MutationOutcome>;
}

/// Splits tuples-only query output into rows of trimmed column values.
#[must_use]
pub fn split_rows(output: &str) -> Vec<Vec<String>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('|').map(|field| field.trim().to_string()).collect())
        .collect()
}

/// [`SqlExecutor`] backed by the `psql` command-line client.
///
/// Queries run with `-tAc` (tuples only, unaligned); mutating statements run
/// with `-c` so the command tag is available for row-count parsing.
#[derive(Debug, Clone)]
pub struct PsqlExecutor {
    database: String,
}

impl PsqlExecutor {
    /// Creates an executor targeting the named database.
    #[must_use]
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    /// The database this executor targets.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    async fn run_psql(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("psql")
            .arg("-d")
            .arg(&self.database)
            .args(args)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                command: "psql".to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(
                database = %self.database,
                exit_code = output.status.code().unwrap_or(-1),
                "psql exited non-zero"
            );
            return Err(Error::execution(output.status.code().unwrap_or(-1), stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SqlExecutor for PsqlExecutor {
    async fn query(&self, sql: &str) -> Result<String> {
        let output = self.run_psql(&["-tAc", sql]).await?;
        Ok(output.trim().to_string())
    }

    async fn execute(&self, sql: &str) -> Result<MutationOutcome> {
        let output = self.run_psql(&["-c", sql]).await?;
        let command_tag = output
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(MutationOutcome {
            rows_affected: parse_affected_rows(&output),
            command_tag,
        })
    }
}
