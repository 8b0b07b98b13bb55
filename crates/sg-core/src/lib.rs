//! sg-core - Core library for SchemaGuard
//!
//! This crate provides the shared types used by the recovery and
//! reconciliation layers: project configuration, the migration file naming
//! convention, migration discovery, and the checkpoint store.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod migration;

pub use checkpoint::{CheckpointStore, CHECKPOINT_FILE_NAME};
pub use config::{Config, DatabaseConfig, MirrorConfig};
pub use error::{CoreError, CoreResult, VersionParseError};
pub use migration::{Direction, Migration, MigrationFile, MigrationSet, NIL_VERSION};
