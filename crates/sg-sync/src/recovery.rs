//! Dirty-state recovery
//!
//! A failed run leaves a checkpoint in the destination directory (see
//! [`crate::failure`]). On the next start, [`Recovery::recover`] forces the
//! engine back to that version and removes the checkpoint so recovery runs
//! exactly once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sg_core::{CheckpointStore, CoreError, CHECKPOINT_FILE_NAME};
use sg_db::MigrationEngine;

use crate::error::{SyncError, SyncResult};

/// Checkpoint-based recovery bound to one engine and destination directory
pub struct Recovery {
    pub(crate) engine: Arc<dyn MigrationEngine>,
    pub(crate) destination: Option<PathBuf>,
    pub(crate) prefetch: usize,
}

impl Recovery {
    /// Create a recovery handle.
    ///
    /// `prefetch` sizes the migration stream buffer used when recording a
    /// failure and must be positive.
    pub fn new(
        engine: Arc<dyn MigrationEngine>,
        destination: Option<PathBuf>,
        prefetch: usize,
    ) -> SyncResult<Self> {
        if prefetch == 0 {
            return Err(SyncError::InvalidPrefetch(prefetch));
        }
        Ok(Self {
            engine,
            destination,
            prefetch,
        })
    }

    /// Destination directory holding the checkpoint, if configured
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Checkpoint store for the configured destination
    pub fn checkpoint(&self) -> Option<CheckpointStore> {
        self.destination.as_deref().map(CheckpointStore::in_dir)
    }

    /// Force the engine back to the recorded checkpoint and delete it.
    ///
    /// A missing checkpoint (or no destination at all) comes back as an
    /// error for which [`SyncError::is_not_found`] is true; the caller
    /// treats that as clean state. Returns the version that was forced,
    /// which is [`sg_core::NIL_VERSION`] when nothing had been applied.
    pub async fn recover(&self) -> SyncResult<i64> {
        let store = self.checkpoint().ok_or_else(|| CoreError::CheckpointNotFound {
            path: CHECKPOINT_FILE_NAME.to_string(),
        })?;

        let version = store.read()?;

        self.engine
            .force(version)
            .await
            .map_err(|source| SyncError::Force { version, source })?;
        log::info!("Successfully applied migration: {}", version);

        store.clear()?;
        log::info!("Successfully deleted file: {}", store.path().display());

        Ok(version)
    }
}

#[cfg(test)]
#[path = "recovery_test.rs"]
mod tests;
