//! Failure checkpoint writer
//!
//! After a batch that was moving from a known-good version toward a target
//! fails, the engine is left dirty at the version that broke. Replaying the
//! ordered stream up to that version tells us the last one that went through;
//! it is written as the checkpoint [`crate::Recovery::recover`] consumes.

use sg_core::{CheckpointStore, NIL_VERSION};
use sg_db::StreamItem;

use crate::error::{SyncError, SyncResult};
use crate::recovery::Recovery;
use crate::stream::MigrationStream;

impl Recovery {
    /// Record the last successfully applied version after a failed batch.
    ///
    /// `known_good` is the version the batch started from, `None` if nothing
    /// had been applied yet, and `failure_target` the exclusive upper bound
    /// it was heading to. Returns the recorded value, [`NIL_VERSION`] when no
    /// migration went through, or `None` without touching the engine or the
    /// filesystem when no destination directory is configured.
    pub async fn record_failure(
        &self,
        known_good: Option<u64>,
        failure_target: u64,
    ) -> SyncResult<Option<i64>> {
        let Some(destination) = self.destination.as_deref() else {
            log::debug!("No destination directory configured; skipping failure checkpoint");
            return Ok(None);
        };

        let failed_version = self
            .engine
            .version()
            .await
            .map_err(SyncError::Engine)?
            .version;

        let mut last_successful = known_good;
        let mut stream = MigrationStream::open(
            self.engine.clone(),
            known_good.unwrap_or(0),
            failure_target,
            self.prefetch,
        )?;

        while let Some(item) = stream.next().await {
            match item {
                StreamItem::Migration(migration) => {
                    if Some(migration.version) == failed_version {
                        break;
                    }
                    last_successful = Some(migration.version);
                }
                StreamItem::Notice(notice) => {
                    log::debug!("Ignoring migration stream notice: {:?}", notice);
                }
            }
        }
        drop(stream);

        let recorded = match last_successful {
            Some(version) => {
                i64::try_from(version).map_err(|_| SyncError::VersionOutOfRange(version))?
            }
            None => NIL_VERSION,
        };
        log::info!(
            "migration failed, last successful migration version: {}",
            recorded
        );
        CheckpointStore::in_dir(destination).write(recorded)?;

        Ok(Some(recorded))
    }
}

#[cfg(test)]
#[path = "failure_test.rs"]
mod tests;
