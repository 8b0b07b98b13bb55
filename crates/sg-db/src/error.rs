//! Error types for sg-db

use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Requested version has no scripts (D003)
    #[error("[D003] Migration version {0} not found")]
    MigrationNotFound(u64),

    /// A migration script failed and left the version dirty (D004)
    #[error("[D004] Migration {version} ({path}) failed: {message}")]
    ScriptFailed {
        version: u64,
        path: String,
        message: String,
    },

    /// Migration directory could not be read (D005)
    #[error("[D005] Migration discovery failed: {0}")]
    Discovery(#[from] sg_core::CoreError),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Version outside the accepted range (D007)
    #[error("[D007] Invalid version {0}")]
    InvalidVersion(i64),

    /// Tracked version is dirty and must be forced first (D008)
    #[error("[D008] Database is dirty at version {0}; force a version before migrating")]
    Dirty(u64),

    /// Script version does not fit the version table (D009)
    #[error("[D009] Migration version {0} exceeds the largest storable version")]
    VersionOutOfRange(u64),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::ExecutionError(err.to_string())
    }
}
