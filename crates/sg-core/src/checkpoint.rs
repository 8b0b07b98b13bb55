//! Checkpoint file holding the last version known to have succeeded
//!
//! The checkpoint lives next to the working migration scripts. Its presence
//! means a previous run failed part-way and left the engine dirty; its
//! absence means there is nothing to recover.
//!
//! The value is stored the way the engine forces it: a version, or
//! [`NIL_VERSION`] when the failure happened before anything was applied.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult, VersionParseError};
use crate::migration::{parse_version, NIL_VERSION};

/// File name of the checkpoint inside the destination directory
pub const CHECKPOINT_FILE_NAME: &str = "lastSuccessfulMigration";

/// Permission bits the checkpoint is written with
#[cfg(unix)]
const CHECKPOINT_MODE: u32 = 0o644;

/// Reads and writes the single-value checkpoint file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store rooted in a destination directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(CHECKPOINT_FILE_NAME),
        }
    }

    /// Full path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a checkpoint is currently recorded
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the recorded version.
    ///
    /// A missing file is reported as [`CoreError::CheckpointNotFound`] so the
    /// caller can treat it as clean state; anything else is a real failure.
    /// Only plain digits or the literal `-1` are accepted.
    pub fn read(&self) -> CoreResult<i64> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let trimmed = content.trim();
        parse_checkpoint(trimmed).map_err(|source| CoreError::CheckpointCorrupt {
            path: self.path.display().to_string(),
            content: trimmed.to_string(),
            source,
        })
    }

    /// Record `version`, replacing any previous value.
    ///
    /// Pass [`NIL_VERSION`] when no migration is known to have succeeded.
    pub fn write(&self, version: i64) -> CoreResult<()> {
        let write_error = |e| CoreError::IoWithPath {
            path: self.path.display().to_string(),
            source: e,
        };
        fs::write(&self.path, version.to_string()).map_err(write_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(CHECKPOINT_MODE))
                .map_err(write_error)?;
        }

        Ok(())
    }

    /// Delete the checkpoint file
    pub fn clear(&self) -> CoreResult<()> {
        fs::remove_file(&self.path).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, err: std::io::Error) -> CoreError {
        if err.kind() == ErrorKind::NotFound {
            CoreError::CheckpointNotFound {
                path: self.path.display().to_string(),
            }
        } else {
            CoreError::IoWithPath {
                path: self.path.display().to_string(),
                source: err,
            }
        }
    }
}

fn parse_checkpoint(text: &str) -> Result<i64, VersionParseError> {
    if text == NIL_VERSION.to_string() {
        return Ok(NIL_VERSION);
    }
    let version = parse_version(text)?;
    i64::try_from(version).map_err(|_| VersionParseError::OutOfRange(text.to_string()))
}

#[cfg(test)]
#[path = "checkpoint_test.rs"]
mod tests;
