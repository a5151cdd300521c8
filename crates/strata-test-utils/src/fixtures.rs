//! Chunk fixtures for catalog snapshots in tests.

use strata_catalog::Chunk;

/// Canonical timestamp text for midnight on day `n` of the fixture month.
pub fn day(n: u32) -> String {
    format!("2025-06-{n:02} 00:00:00+00")
}

/// Builds a chunk with the internal-schema naming used by real hypertables.
pub fn chunk(index: usize, compressed: bool, range_start: &str, range_end: &str) -> Chunk {
    Chunk {
        schema: "_timescaledb_internal".to_string(),
        name: format!("_hyper_1_{index}_chunk"),
        compressed,
        range_start: range_start.to_string(),
        range_end: range_end.to_string(),
    }
}

/// Renders chunks as the tuples-only catalog output the executor returns.
pub fn catalog_rows(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| {
            format!(
                "{}|{}|{}|{}|{}",
                c.schema, c.name, c.compressed, c.range_start, c.range_end
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
