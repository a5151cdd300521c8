//! The mutation profile seam.

/// Defines one mutation operation over a time-partitioned relation.
///
/// A profile renders statements scoped to a chunk's half-open time range, so
/// tasks for different chunks never target overlapping rows — that is what
/// makes them safe to run in parallel. All state a profile captures (an id
/// set, a mapping-table name) must be immutable; profiles are shared across
/// worker tasks behind an `Arc`.
///
/// The rendered statement must also exclude already-mutated rows, so that
/// re-applying it is a no-op. That property is what makes whole runs
/// idempotent and safely re-runnable.
pub trait MutationProfile: Send + Sync {
    /// Human-readable description for logs and progress output.
    fn describe(&self) -> String;

    /// The mutation statement scoped to `[range_start, range_end)`.
    ///
    /// Bounds are catalog timestamp text and are interpolated with a
    /// `::timestamptz` cast.
    fn statement_for_range(&self, range_start: &str, range_end: &str) -> String;

    /// A count query for rows still matching the mutation's predicate.
    ///
    /// Used before a run (to size the work) and after it (to verify
    /// convergence).
    fn remaining_count_sql(&self) -> String;
}
