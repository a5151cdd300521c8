//! Error types for orchestration runs.

use thiserror::Error;

use strata_catalog::CatalogError;

/// Result type alias for orchestration runs.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a whole run.
///
/// Everything else — decompress hiccups, statement failures, recompress
/// misses — is contained to one chunk's [`crate::ChunkReport`] and never
/// stops sibling chunks.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested worker-pool size is unusable.
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// Chunk discovery failed before any mutation was issued.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
