//! Error types for sg-sync

use sg_core::CoreError;
use sg_db::DbError;
use thiserror::Error;

/// Recovery and reconciliation errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// Checkpoint or config failure from sg-core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// S001: Forcing the recovered version failed
    #[error("[S001] Failed to apply last successful migration {version}: {source}")]
    Force { version: i64, source: DbError },

    /// S002: Querying the engine failed
    #[error("[S002] Failed to read migration version: {0}")]
    Engine(#[source] DbError),

    /// S003: Filesystem operation failed
    #[error("[S003] IO error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// S004: Walking the source tree failed
    #[error("[S004] Failed to walk '{path}': {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },

    /// S005: Stream buffer must hold at least one item
    #[error("[S005] Invalid prefetch size {0}: must be a positive integer")]
    InvalidPrefetch(usize),

    /// S006: Version does not fit the engine's signed version
    #[error("[S006] Checkpoint version {0} is out of range")]
    VersionOutOfRange(u64),
}

impl SyncError {
    /// Whether this error only signals a missing checkpoint (clean state)
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Core(e) if e.is_not_found())
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for SyncError
pub type SyncResult<T> = Result<T, SyncError>;
