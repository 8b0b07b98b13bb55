//! Migration engine trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sg_core::Migration;
use tokio::sync::mpsc;

pub use sg_core::NIL_VERSION;

/// Version recorded in the engine's store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackedVersion {
    /// Applied version, `None` when nothing has been applied
    pub version: Option<u64>,

    /// Set while a migration is in progress or after it failed
    pub dirty: bool,
}

impl TrackedVersion {
    /// Clean state at `version`
    pub fn clean(version: u64) -> Self {
        Self {
            version: Some(version),
            dirty: false,
        }
    }

    /// Dirty state at `version`
    pub fn dirty(version: u64) -> Self {
        Self {
            version: Some(version),
            dirty: true,
        }
    }
}

/// Control message travelling on the migration stream next to descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Requested range is empty
    NoChange,
    /// Producer could not continue; the stream ends after this item
    Failed(String),
}

/// Element of the migration stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    /// A migration descriptor, in ascending version order
    Migration(Migration),
    /// Anything that is not a descriptor
    Notice(Notice),
}

/// Migration engine abstraction used by the recovery layer
///
/// Implementations must be Send + Sync so the stream producer can run on its
/// own task.
#[async_trait]
pub trait MigrationEngine: Send + Sync {
    /// Set the tracked version without running any script.
    ///
    /// [`NIL_VERSION`] clears it. Forcing the same version twice is a no-op.
    async fn force(&self, version: i64) -> DbResult<()>;

    /// Currently tracked version and dirty flag
    async fn version(&self) -> DbResult<TrackedVersion>;

    /// Emit up-migrations for every known version in `[from, to)` into `out`,
    /// ascending.
    ///
    /// The channel closes when `out` is dropped on return. Implementations
    /// must return as soon as a send fails, since that means the consumer
    /// has gone away.
    async fn read_migrations(&self, from: u64, to: u64, out: mpsc::Sender<StreamItem>);

    /// Engine type identifier for logging
    fn engine_type(&self) -> &'static str;
}
