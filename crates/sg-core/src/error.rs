//! Error types for sg-core

use thiserror::Error;

/// Core error type for SchemaGuard
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Two scripts declare the same version and direction
    #[error("[E004] Duplicate {direction} migration for version {version}: {first} and {second}")]
    DuplicateMigration {
        version: u64,
        direction: String,
        first: String,
        second: String,
    },

    /// E005: Checkpoint file not found (clean state)
    #[error("[E005] Checkpoint not found: {path}")]
    CheckpointNotFound { path: String },

    /// E006: Checkpoint content is not a valid version
    #[error("[E006] Failed to parse checkpoint '{path}' (content {content:?}): {source}")]
    CheckpointCorrupt {
        path: String,
        content: String,
        source: VersionParseError,
    },

    /// E007: IO error
    #[error("[E007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E008: IO error with file path context
    #[error("[E008] IO error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// A version string that is not a plain unsigned decimal number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    /// Empty, signed, or containing anything but ASCII digits
    #[error("expected unsigned decimal digits, got {0:?}")]
    NotDigits(String),

    /// Digits only, but too large for a version
    #[error("version {0} is out of range")]
    OutOfRange(String),
}

impl CoreError {
    /// Whether this error signals an absent checkpoint rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::CheckpointNotFound { .. })
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
