//! Bounded, lazily consumed stream of migration descriptors
//!
//! The engine's producer runs on its own task and pushes into a channel of
//! `prefetch` slots, blocking once the consumer falls behind. Dropping the
//! stream closes the channel and aborts the producer, so stopping early
//! never leaves a task parked on a full buffer.

use std::sync::Arc;

use sg_db::{MigrationEngine, StreamItem};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{SyncError, SyncResult};

/// Ordered migration descriptors for a half-open version range
pub struct MigrationStream {
    rx: mpsc::Receiver<StreamItem>,
    producer: JoinHandle<()>,
}

impl MigrationStream {
    /// Start producing descriptors for `[from, to)` with room for
    /// `prefetch` buffered items.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        engine: Arc<dyn MigrationEngine>,
        from: u64,
        to: u64,
        prefetch: usize,
    ) -> SyncResult<Self> {
        if prefetch == 0 {
            return Err(SyncError::InvalidPrefetch(prefetch));
        }

        let (tx, rx) = mpsc::channel(prefetch);
        let producer = tokio::spawn(async move {
            engine.read_migrations(from, to, tx).await;
        });

        Ok(Self { rx, producer })
    }

    /// Next item, or `None` once the producer is done
    pub async fn next(&mut self) -> Option<StreamItem> {
        self.rx.recv().await
    }

    /// Whether the producer task has exited
    pub fn producer_finished(&self) -> bool {
        self.producer.is_finished()
    }
}

impl Drop for MigrationStream {
    fn drop(&mut self) {
        self.rx.close();
        self.producer.abort();
    }
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
