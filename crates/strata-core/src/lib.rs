//! # strata-core
//!
//! Shared kernel for the strata chunk-mutation tooling.
//!
//! This crate provides the primitives every other strata component builds on:
//!
//! - **Error Types**: shared error definitions and the result alias
//! - **SQL Executor**: the boundary to the target database, with a
//!   `psql`-backed implementation
//! - **Row-Count Parsing**: extraction of affected-row counts from command
//!   tags
//!
//! ## Crate Boundary
//!
//! `strata-core` owns the executor contract. Components above it (catalog,
//! mutator, orchestrator) talk to the database exclusively through
//! [`SqlExecutor`], which keeps them testable against a scripted double.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod executor;
pub mod rowcount;

pub use error::{Error, Result};
pub use executor::{split_rows, MutationOutcome, PsqlExecutor, SqlExecutor};
pub use rowcount::parse_affected_rows;
