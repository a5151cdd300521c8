//! Built-in mutation profiles.
//!
//! Both operations here mutate rows whose row set shrinks as the mutation
//! applies, so re-running them is a no-op on already-handled rows.

use crate::profile::MutationProfile;

/// Mutating statements disable the DML tuple-decompression cap for the
/// session; chunk-sized row sets routinely exceed the default.
const DML_DECOMPRESSION_CAP_OFF: &str =
    "SET timescaledb.max_tuples_decompressed_per_dml_transaction = 0;";

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Deletes rows whose id column matches a fixed id set.
///
/// The id set is captured once at construction and is immutable for the
/// lifetime of the profile; worker tasks share it read-only.
pub struct PurgeProfile {
    table: String,
    time_column: String,
    id_column: String,
    quoted_ids: String,
    id_count: usize,
}

impl PurgeProfile {
    /// Creates a purge of `table` rows whose `id_column` is in `ids`.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        time_column: impl Into<String>,
        id_column: impl Into<String>,
        ids: &[String],
    ) -> Self {
        let quoted_ids = ids
            .iter()
            .map(|id| quote_literal(id))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            table: table.into(),
            time_column: time_column.into(),
            id_column: id_column.into(),
            quoted_ids,
            id_count: ids.len(),
        }
    }

    /// Number of ids in the purge set.
    #[must_use]
    pub fn id_count(&self) -> usize {
        self.id_count
    }
}

impl MutationProfile for PurgeProfile {
    fn describe(&self) -> String {
        format!(
            "purge {} rows matching {} ids on {}",
            self.table, self.id_count, self.id_column
        )
    }

    fn statement_for_range(&self, range_start: &str, range_end: &str) -> String {
        format!(
            "{DML_DECOMPRESSION_CAP_OFF} \
             DELETE FROM {table} \
             WHERE {id} IN ({ids}) \
             AND {tc} >= '{range_start}'::timestamptz \
             AND {tc} < '{range_end}'::timestamptz",
            table = self.table,
            id = self.id_column,
            ids = self.quoted_ids,
            tc = self.time_column,
        )
    }

    fn remaining_count_sql(&self) -> String {
        format!(
            "SELECT count(*) FROM {table} WHERE {id} IN ({ids})",
            table = self.table,
            id = self.id_column,
            ids = self.quoted_ids,
        )
    }
}

/// Rewrites an id column through a mapping table.
///
/// Rows whose key appears in the mapping's from-column are updated to the
/// corresponding to-column value. Updated rows no longer match the mapping's
/// from-column, which is what keeps the operation idempotent.
pub struct RemapProfile {
    table: String,
    time_column: String,
    key_column: String,
    mapping_table: String,
    from_column: String,
    to_column: String,
}

impl RemapProfile {
    /// Creates a remap of `table.key_column` through `mapping_table`.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        time_column: impl Into<String>,
        key_column: impl Into<String>,
        mapping_table: impl Into<String>,
        from_column: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            time_column: time_column.into(),
            key_column: key_column.into(),
            mapping_table: mapping_table.into(),
            from_column: from_column.into(),
            to_column: to_column.into(),
        }
    }

    /// The mapping table driving the rewrite.
    #[must_use]
    pub fn mapping_table(&self) -> &str {
        &self.mapping_table
    }
}

impl MutationProfile for RemapProfile {
    fn describe(&self) -> String {
        format!(
            "remap {}.{} via {}",
            self.table, self.key_column, self.mapping_table
        )
    }

    fn statement_for_range(&self, range_start: &str, range_end: &str) -> String {
        format!(
            "{DML_DECOMPRESSION_CAP_OFF} \
             UPDATE {table} t \
             SET {key} = m.{to} \
             FROM {mapping} m \
             WHERE t.{key} = m.{from} \
             AND t.{tc} >= '{range_start}'::timestamptz \
             AND t.{tc} < '{range_end}'::timestamptz",
            table = self.table,
            key = self.key_column,
            to = self.to_column,
            mapping = self.mapping_table,
            from = self.from_column,
            tc = self.time_column,
        )
    }

    fn remaining_count_sql(&self) -> String {
        format!(
            "SELECT count(*) FROM {table} t \
             WHERE EXISTS (SELECT 1 FROM {mapping} m WHERE t.{key} = m.{from})",
            table = self.table,
            mapping = self.mapping_table,
            key = self.key_column,
            from = self.from_column,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_statement_is_range_scoped() {
        let profile = PurgeProfile::new(
            "fixes",
            "received_at",
            "aircraft_id",
            &["a1".to_string(), "a2".to_string()],
        );
        let sql = profile.statement_for_range("2025-06-01 00:00:00+00", "2025-06-08 00:00:00+00");

        assert!(sql.contains("DELETE FROM fixes"));
        assert!(sql.contains("aircraft_id IN ('a1', 'a2')"));
        assert!(sql.contains("received_at >= '2025-06-01 00:00:00+00'::timestamptz"));
        assert!(sql.contains("received_at < '2025-06-08 00:00:00+00'::timestamptz"));
        assert!(sql.contains("max_tuples_decompressed_per_dml_transaction = 0"));
    }

    #[test]
    fn purge_escapes_embedded_quotes() {
        let profile = PurgeProfile::new("t", "ts", "id", &["o'brien".to_string()]);
        assert!(profile.remaining_count_sql().contains("'o''brien'"));
    }

    #[test]
    fn remap_statement_joins_the_mapping_table() {
        let profile = RemapProfile::new(
            "fixes",
            "received_at",
            "aircraft_id",
            "aircraft_merge_mapping",
            "flarm_id",
            "icao_id",
        );
        let sql = profile.statement_for_range("2025-06-01 00:00:00+00", "2025-06-08 00:00:00+00");

        assert!(sql.contains("UPDATE fixes t"));
        assert!(sql.contains("SET aircraft_id = m.icao_id"));
        assert!(sql.contains("FROM aircraft_merge_mapping m"));
        assert!(sql.contains("t.aircraft_id = m.flarm_id"));
        assert!(sql.contains("t.received_at >= '2025-06-01 00:00:00+00'::timestamptz"));
    }

    #[test]
    fn remap_remaining_count_uses_exists() {
        let profile = RemapProfile::new("fixes", "ts", "k", "map", "f", "t");
        let sql = profile.remaining_count_sql();
        assert!(sql.starts_with("SELECT count(*)"));
        assert!(sql.contains("EXISTS"));
    }
}
