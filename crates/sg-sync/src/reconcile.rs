//! Working-directory reconciliation
//!
//! The engine reads scripts from a mutable destination directory. This module
//! keeps it in step with the canonical source tree and a target version:
//!
//! - [`Reconciler::prune_above`] deletes scripts newer than the target
//! - [`Reconciler::mirror`] flattens the source tree into the destination,
//!   skipping the test subtree and the "current" marker file
//!
//! Prune is best-effort per file by default while mirror aborts on the first
//! failure, since a half-copied migration set is not safe to run. Both can be
//! overridden with [`FailurePolicy`].

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use sg_core::migration::{is_migration_script, parse_version, version_prefix};
use sg_core::Config;
use walkdir::WalkDir;

use crate::error::{SyncError, SyncResult};

/// How a per-file failure affects the rest of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next file
    BestEffort,
    /// Stop and return the failure
    Abort,
}

impl FailurePolicy {
    fn handle(self, err: SyncError) -> SyncResult<()> {
        match self {
            FailurePolicy::BestEffort => {
                log::warn!("{}", err);
                Ok(())
            }
            FailurePolicy::Abort => Err(err),
        }
    }
}

/// Outcome of a prune pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Scripts removed for being above the target
    pub deleted: Vec<String>,
    /// Scripts whose version prefix did not parse
    pub skipped: Vec<String>,
    /// Scripts that could not be removed
    pub failed: Vec<String>,
}

/// Outcome of a mirror pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Files copied into the destination, by base name
    pub copied: Vec<String>,
    /// Excluded directories and marker files
    pub skipped: Vec<String>,
    /// Files that could not be copied
    pub failed: Vec<String>,
}

/// Outcome of [`Reconciler::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Mirror step
    pub mirror: MirrorReport,
    /// Prune step, when a target was given
    pub prune: Option<PruneReport>,
}

/// Keeps a working migration directory in sync with its source
#[derive(Debug, Clone)]
pub struct Reconciler {
    source: PathBuf,
    destination: Option<PathBuf>,
    exclude_dir: String,
    current_file: String,
    prune_policy: FailurePolicy,
    mirror_policy: FailurePolicy,
}

impl Reconciler {
    /// Reconciler with the default exclusions (`tests/`, `current.sql`)
    pub fn new(source: impl Into<PathBuf>, destination: Option<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination,
            exclude_dir: "tests".to_string(),
            current_file: "current.sql".to_string(),
            prune_policy: FailurePolicy::BestEffort,
            mirror_policy: FailurePolicy::Abort,
        }
    }

    /// Reconciler for a project rooted at `root`
    pub fn from_config(config: &Config, root: &Path) -> Self {
        Self::new(
            config.source_dir_absolute(root),
            config.dest_dir_absolute(root),
        )
        .with_exclusions(&config.mirror.exclude_dir, &config.mirror.current_file)
    }

    /// Override the excluded directory and marker file names
    pub fn with_exclusions(mut self, exclude_dir: &str, current_file: &str) -> Self {
        self.exclude_dir = exclude_dir.to_string();
        self.current_file = current_file.to_string();
        self
    }

    /// Override the per-file failure policy for prune
    pub fn with_prune_policy(mut self, policy: FailurePolicy) -> Self {
        self.prune_policy = policy;
        self
    }

    /// Override the per-file failure policy for mirror
    pub fn with_mirror_policy(mut self, policy: FailurePolicy) -> Self {
        self.mirror_policy = policy;
        self
    }

    /// Source tree being mirrored
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Working directory, if configured
    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Delete scripts in the destination whose version is above `target`.
    ///
    /// Only listing the directory is fatal. Files without an underscore are
    /// left alone, unparsable versions are logged and skipped, and delete
    /// failures follow the prune policy.
    pub fn prune_above(&self, target: u64) -> SyncResult<PruneReport> {
        let mut report = PruneReport::default();
        let Some(destination) = self.destination.as_deref() else {
            return Ok(report);
        };

        let entries = fs::read_dir(destination).map_err(|e| SyncError::io(destination, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| SyncError::io(destination, e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !is_migration_script(&file_name) {
                continue;
            }
            let Some(prefix) = version_prefix(&file_name) else {
                continue;
            };

            let version = match parse_version(prefix) {
                Ok(version) => version,
                Err(e) => {
                    log::info!(
                        "Skipping file {} due to version parse error: {}",
                        file_name,
                        e
                    );
                    report.skipped.push(file_name);
                    continue;
                }
            };

            if version <= target {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    log::info!("Deleted file: {}", file_name);
                    report.deleted.push(file_name);
                }
                Err(e) => {
                    report.failed.push(file_name);
                    self.prune_policy.handle(SyncError::io(&entry.path(), e))?;
                }
            }
        }

        report.deleted.sort();
        report.skipped.sort();
        report.failed.sort();
        Ok(report)
    }

    /// Copy every eligible file under the source tree into the destination.
    ///
    /// The destination must already exist. Subdirectories are flattened by
    /// base name. A source root that is itself named like the excluded
    /// directory is skipped whole. Walk errors are always fatal; per-file copy failures follow
    /// the mirror policy.
    pub fn mirror(&self) -> SyncResult<MirrorReport> {
        let mut report = MirrorReport::default();
        let Some(destination) = self.destination.as_deref() else {
            return Ok(report);
        };

        fs::read_dir(destination).map_err(|e| SyncError::io(destination, e))?;

        log::info!(
            "Copying files from {} to {}",
            self.source.display(),
            destination.display()
        );

        let mut walker = WalkDir::new(&self.source).into_iter();
        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| SyncError::Walk {
                path: self.source.display().to_string(),
                source: e,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();

            if entry.file_type().is_dir() {
                if name == self.exclude_dir {
                    log::info!("Ignoring directory {}", name);
                    report.skipped.push(name);
                    walker.skip_current_dir();
                }
                continue;
            }

            if name == self.current_file {
                log::info!("Ignoring file {}", name);
                report.skipped.push(name);
                continue;
            }

            let target = destination.join(&name);
            match copy_file(entry.path(), &target) {
                Ok(()) => report.copied.push(name),
                Err(e) => {
                    report.failed.push(name);
                    self.mirror_policy.handle(e)?;
                }
            }
        }

        report.copied.sort();
        report.skipped.sort();
        report.failed.sort();
        Ok(report)
    }

    /// Mirror the source, then prune above `target` when one is given
    pub fn sync(&self, target: Option<u64>) -> SyncResult<SyncReport> {
        let mirror = self.mirror()?;
        let prune = target.map(|t| self.prune_above(t)).transpose()?;
        Ok(SyncReport { mirror, prune })
    }
}

/// Stream `src` into `dest`, then carry the source permissions over.
///
/// Permissions are only applied once the copy succeeded; a failed copy
/// returns its own error.
fn copy_file(src: &Path, dest: &Path) -> SyncResult<()> {
    let mut reader = File::open(src).map_err(|e| SyncError::io(src, e))?;
    let mut writer = File::create(dest).map_err(|e| SyncError::io(dest, e))?;

    io::copy(&mut reader, &mut writer).map_err(|e| SyncError::io(dest, e))?;

    let permissions = reader
        .metadata()
        .map_err(|e| SyncError::io(src, e))?
        .permissions();
    fs::set_permissions(dest, permissions).map_err(|e| SyncError::io(dest, e))
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
