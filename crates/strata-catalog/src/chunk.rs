//! The chunk model.

use serde::Serialize;

/// One physical, time-bounded storage partition of a hypertable.
///
/// Range bounds are kept as the catalog's canonical timestamp text and are
/// only ever compared for ordering or interpolated back into SQL with a
/// `::timestamptz` cast; the tool never needs to interpret them as instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Schema the chunk lives in.
    pub schema: String,
    /// Local chunk name, unique within the schema.
    pub name: String,
    /// Compression state at catalog-snapshot time.
    pub compressed: bool,
    /// Inclusive lower bound of the chunk's time range.
    pub range_start: String,
    /// Exclusive upper bound of the chunk's time range.
    pub range_end: String,
}

impl Chunk {
    /// Schema-qualified chunk name, as accepted by the compression functions.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Whether `next` starts exactly where this chunk ends.
    ///
    /// Used to decide if a run of chunks covers a contiguous time range.
    #[must_use]
    pub fn abuts(&self, next: &Chunk) -> bool {
        self.range_end == next.range_start
    }

    /// Parses a chunk from one catalog row.
    ///
    /// Expects exactly five columns: schema, name, compression flag, range
    /// start, range end. Returns `None` for anything else.
    #[must_use]
    pub fn from_row(row: &[String]) -> Option<Self> {
        match row {
            [schema, name, compressed, range_start, range_end] => Some(Self {
                schema: schema.clone(),
                name: name.clone(),
                compressed: matches!(compressed.as_str(), "t" | "true"),
                range_start: range_start.clone(),
                range_end: range_end.clone(),
            }),
            _ => None,
        }
    }
}
