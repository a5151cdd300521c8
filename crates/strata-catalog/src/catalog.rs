//! Chunk discovery against the hypertable catalog.

use std::sync::Arc;

use strata_core::{split_rows, SqlExecutor};

use crate::chunk::Chunk;
use crate::error::{CatalogError, Result};

/// Discovers the chunks of a named hypertable.
pub struct ChunkCatalog {
    executor: Arc<dyn SqlExecutor>,
}

impl ChunkCatalog {
    /// Creates a catalog over the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self { executor }
    }

    /// Lists all chunks of `hypertable`, ordered by range start ascending.
    ///
    /// The snapshot reflects compression state at call time. A hypertable
    /// with no chunks yields an empty list, not an error. Malformed catalog
    /// rows are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the catalog query itself
    /// fails; the caller must abort before issuing any mutation.
    pub async fn list_chunks(&self, hypertable: &str) -> Result<Vec<Chunk>> {
        let sql = format!(
            "SELECT chunk_schema, chunk_name, is_compressed::text, \
             range_start::text, range_end::text \
             FROM timescaledb_information.chunks \
             WHERE hypertable_name = '{hypertable}' \
             ORDER BY range_start"
        );

        let output = self
            .executor
            .query(&sql)
            .await
            .map_err(|err| CatalogError::unavailable(err.to_string()))?;

        let mut chunks = Vec::new();
        for row in split_rows(&output) {
            match Chunk::from_row(&row) {
                Some(chunk) => chunks.push(chunk),
                None => tracing::warn!(?row, "skipping malformed catalog row"),
            }
        }

        tracing::debug!(
            hypertable,
            total = chunks.len(),
            compressed = chunks.iter().filter(|c| c.compressed).count(),
            "chunk snapshot taken"
        );

        Ok(chunks)
    }
}
