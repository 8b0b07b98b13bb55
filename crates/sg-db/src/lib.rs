//! sg-db - Migration engine for SchemaGuard
//!
//! This crate provides the `MigrationEngine` trait consumed by the recovery
//! layer and a DuckDB implementation that applies scripts from a migration
//! directory and tracks the applied version in a table.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbEngine;
pub use error::{DbError, DbResult};
pub use traits::{MigrationEngine, Notice, StreamItem, TrackedVersion, NIL_VERSION};
