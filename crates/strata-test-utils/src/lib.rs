//! Shared test utilities for strata.
//!
//! This crate provides:
//! - [`ScriptedExecutor`]: an in-memory [`SqlExecutor`] double with canned
//!   responses, a full statement log, and an in-flight gauge for concurrency
//!   assertions
//! - Chunk fixtures for building catalog snapshots in tests
//! - [`init_test_logging`] for tracing output inside tests
//!
//! [`SqlExecutor`]: strata_core::SqlExecutor

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod executor;
pub mod fixtures;

pub use executor::{ScriptedExecutor, ScriptedExecutorBuilder};
pub use fixtures::{catalog_rows, chunk, day};

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("strata=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
