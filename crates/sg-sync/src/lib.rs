//! sg-sync - Recovery and reconciliation for SchemaGuard
//!
//! This crate sits on top of a [`sg_db::MigrationEngine`] and provides:
//!
//! - dirty-state recovery from a checkpoint left by a failed run
//! - the failure checkpoint writer that records the last good version
//! - a bounded, early-terminable stream of migration descriptors
//! - reconciliation of a working migration directory against its source
//!   and a target version

pub mod error;
pub mod failure;
pub mod reconcile;
pub mod recovery;
pub mod stream;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{SyncError, SyncResult};
pub use reconcile::{FailurePolicy, MirrorReport, PruneReport, Reconciler, SyncReport};
pub use recovery::Recovery;
pub use stream::MigrationStream;
