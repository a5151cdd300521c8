//! Error types and result alias for strata.
//!
//! Failures at this layer are always about a single SQL round-trip. Whether a
//! failed round-trip is fatal is decided by the caller: the catalog treats it
//! as unavailability, the mutator contains it to one chunk's outcome.

/// The result type used throughout strata.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the SQL executor boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A statement ran and the database client exited non-zero.
    #[error("sql execution failed (exit code {exit_code}): {stderr}")]
    Execution {
        /// Process exit code (`-1` when terminated by a signal).
        exit_code: i32,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The database client process could not be launched at all.
    #[error("failed to launch {command}: {source}")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A query succeeded but returned output the caller could not interpret.
    #[error("unexpected query output: {message}")]
    UnexpectedOutput {
        /// Description of what was expected and what arrived.
        message: String,
    },
}

impl Error {
    /// Creates an execution error from an exit code and captured stderr.
    #[must_use]
    pub fn execution(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::Execution {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates an unexpected-output error with the given message.
    #[must_use]
    pub fn unexpected_output(message: impl Into<String>) -> Self {
        Self::UnexpectedOutput {
            message: message.into(),
        }
    }
}
