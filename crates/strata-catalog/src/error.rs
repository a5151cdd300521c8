//! Error types for catalog operations.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during chunk discovery.
///
/// Catalog failures are fatal to an orchestration run: without a chunk
/// snapshot there is nothing safe to mutate, so the run aborts before any
/// statement is issued.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The chunk catalog could not be queried.
    #[error("chunk catalog unavailable: {message}")]
    Unavailable {
        /// Description of the underlying executor failure.
        message: String,
    },
}

impl CatalogError {
    /// Creates an unavailability error from an executor failure.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
