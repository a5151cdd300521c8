//! Post-run convergence verification.
//!
//! Verification is the sole source of truth for completion: a run may be
//! interrupted at any point and re-run from scratch, and only a remaining
//! count of zero means the operation has converged.

use strata_core::{Error, Result, SqlExecutor};

use crate::profile::MutationProfile;

/// Counts rows still matching the profile's mutation predicate.
///
/// Runs as a plain count query; no decompression is involved.
///
/// # Errors
///
/// Returns the executor's error when the count query fails, or
/// [`Error::UnexpectedOutput`] when the result is not a number — a
/// verification count that cannot be read must never pass for convergence.
pub async fn count_remaining(
    executor: &dyn SqlExecutor,
    profile: &dyn MutationProfile,
) -> Result<u64> {
    let output = executor.query(&profile.remaining_count_sql()).await?;
    output.trim().parse().map_err(|_| {
        Error::unexpected_output(format!("expected a row count, got '{output}'"))
    })
}

#[cfg(test)]
mod tests {
    use strata_test_utils::ScriptedExecutor;

    use super::*;
    use crate::profiles::PurgeProfile;

    fn profile() -> PurgeProfile {
        PurgeProfile::new("fixes", "received_at", "aircraft_id", &["a1".to_string()])
    }

    #[tokio::test]
    async fn parses_remaining_count() {
        let executor = ScriptedExecutor::builder()
            .on("SELECT count(*)", "17")
            .build();
        let remaining = count_remaining(&executor, &profile()).await.expect("count");
        assert_eq!(remaining, 17);
    }

    #[tokio::test]
    async fn zero_means_convergence() {
        let executor = ScriptedExecutor::builder().on("SELECT count(*)", "0").build();
        let remaining = count_remaining(&executor, &profile()).await.expect("count");
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn unreadable_count_is_an_error() {
        let executor = ScriptedExecutor::builder()
            .on("SELECT count(*)", "not-a-number")
            .build();
        let err = count_remaining(&executor, &profile()).await.expect_err("must fail");
        assert!(matches!(err, Error::UnexpectedOutput { .. }));
    }
}
