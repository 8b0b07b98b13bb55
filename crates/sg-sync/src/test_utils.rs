//! Shared test utilities for sg-sync

use async_trait::async_trait;
use sg_core::{Direction, Migration};
use sg_db::{DbError, DbResult, MigrationEngine, Notice, StreamItem, TrackedVersion};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// In-memory engine with scripted versions that records every call
#[derive(Default)]
pub struct FakeEngine {
    versions: Vec<u64>,
    tracked: Mutex<TrackedVersion>,
    forced: Mutex<Vec<i64>>,
    leading_notices: Vec<Notice>,
    fail_force: bool,
    fail_version: bool,
    sent: AtomicUsize,
    producer_done: Arc<AtomicBool>,
}

/// Flags the producer as done however it exits, abort included
struct DoneGuard(Arc<AtomicBool>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl FakeEngine {
    /// Engine whose migration source holds `versions`
    pub fn new(versions: impl IntoIterator<Item = u64>) -> Self {
        let mut versions: Vec<u64> = versions.into_iter().collect();
        versions.sort_unstable();
        Self {
            versions,
            ..Default::default()
        }
    }

    /// Start from a given tracked version
    pub fn with_tracked(self, tracked: TrackedVersion) -> Self {
        *self.tracked.lock().unwrap() = tracked;
        self
    }

    /// Emit `notice` before any descriptor
    pub fn with_leading_notice(mut self, notice: Notice) -> Self {
        self.leading_notices.push(notice);
        self
    }

    /// Make `force` fail
    pub fn failing_force(mut self) -> Self {
        self.fail_force = true;
        self
    }

    /// Make `version` fail
    pub fn failing_version(mut self) -> Self {
        self.fail_version = true;
        self
    }

    /// Every version passed to `force`, in call order
    pub fn forced(&self) -> Vec<i64> {
        self.forced.lock().unwrap().clone()
    }

    /// Current tracked state
    pub fn tracked(&self) -> TrackedVersion {
        *self.tracked.lock().unwrap()
    }

    /// Descriptors successfully handed to the channel
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    /// Whether the last producer has exited
    pub fn producer_done(&self) -> bool {
        self.producer_done.load(Ordering::SeqCst)
    }

    fn descriptor(version: u64) -> Migration {
        Migration {
            version,
            identifier: format!("step_{}", version),
            direction: Direction::Up,
            path: PathBuf::from(format!("{}_step_{}.up.sql", version, version)),
        }
    }
}

#[async_trait]
impl MigrationEngine for FakeEngine {
    async fn force(&self, version: i64) -> DbResult<()> {
        self.forced.lock().unwrap().push(version);
        if self.fail_force {
            return Err(DbError::ExecutionError("force rejected".to_string()));
        }
        *self.tracked.lock().unwrap() = TrackedVersion {
            version: u64::try_from(version).ok(),
            dirty: false,
        };
        Ok(())
    }

    async fn version(&self) -> DbResult<TrackedVersion> {
        if self.fail_version {
            return Err(DbError::ConnectionError("version store unavailable".to_string()));
        }
        Ok(self.tracked())
    }

    async fn read_migrations(&self, from: u64, to: u64, out: mpsc::Sender<StreamItem>) {
        self.producer_done.store(false, Ordering::SeqCst);
        let _guard = DoneGuard(Arc::clone(&self.producer_done));

        for notice in &self.leading_notices {
            if out.send(StreamItem::Notice(notice.clone())).await.is_err() {
                return;
            }
        }

        for version in self.versions.iter().copied().filter(|v| (from..to).contains(v)) {
            if out
                .send(StreamItem::Migration(Self::descriptor(version)))
                .await
                .is_err()
            {
                return;
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn engine_type(&self) -> &'static str {
        "fake"
    }
}
