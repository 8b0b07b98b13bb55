//! Migration descriptors and the on-disk naming convention
//!
//! Migration scripts live flat in a directory and are named
//! `<version>_<identifier>.<up|down>.sql`. Only the version prefix (up to the
//! first underscore) and the `up.sql` / `down.sql` suffix carry meaning for
//! reconciliation; the full form is required for discovery.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult, VersionParseError};

/// Engine version value meaning "no migration applied"
pub const NIL_VERSION: i64 = -1;

/// Suffix of scripts that apply a migration
pub const UP_SUFFIX: &str = "up.sql";

/// Suffix of scripts that revert a migration
pub const DOWN_SUFFIX: &str = "down.sql";

/// Direction a migration script moves the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single migration step as handed out by the engine's stream.
///
/// Descriptors are built once and never mutated; consumers own them for the
/// duration of iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Schema version this migration produces (up) or reverts (down)
    pub version: u64,

    /// Human-readable name taken from the file name
    pub identifier: String,

    /// Direction of the script
    pub direction: Direction,

    /// Location of the script on disk
    pub path: PathBuf,
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.version, self.direction, self.identifier)
    }
}

/// Returns `true` for file names ending in `up.sql` or `down.sql`
pub fn is_migration_script(file_name: &str) -> bool {
    file_name.ends_with(UP_SUFFIX) || file_name.ends_with(DOWN_SUFFIX)
}

/// The text before the first underscore, if the name has one
pub fn version_prefix(file_name: &str) -> Option<&str> {
    file_name.find('_').map(|end| &file_name[..end])
}

/// Parse a version made only of ASCII digits.
///
/// Signs, whitespace and empty strings are rejected even where
/// `str::parse` would accept them.
pub fn parse_version(text: &str) -> Result<u64, VersionParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::NotDigits(text.to_string()));
    }
    text.parse().map_err(|_| VersionParseError::OutOfRange(text.to_string()))
}

/// A strictly parsed `<version>_<identifier>.<up|down>.sql` file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Version prefix
    pub version: u64,
    /// Name between the version and the direction
    pub identifier: String,
    /// Script direction
    pub direction: Direction,
}

impl MigrationFile {
    /// Parse a file name; `None` if it does not follow the convention
    pub fn parse(file_name: &str) -> Option<Self> {
        let (stem, direction) = if let Some(stem) = file_name.strip_suffix(".up.sql") {
            (stem, Direction::Up)
        } else if let Some(stem) = file_name.strip_suffix(".down.sql") {
            (stem, Direction::Down)
        } else {
            return None;
        };

        let (version, identifier) = stem.split_once('_')?;

        Some(Self {
            version: parse_version(version).ok()?,
            identifier: identifier.to_string(),
            direction,
        })
    }
}

/// Up and down scripts registered for one version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionScripts {
    /// Identifier of the first script seen for this version
    pub identifier: String,
    /// Path of the up script
    pub up: Option<PathBuf>,
    /// Path of the down script
    pub down: Option<PathBuf>,
}

/// Ordered set of migrations discovered in a directory
#[derive(Debug, Clone, Default)]
pub struct MigrationSet {
    scripts: BTreeMap<u64, VersionScripts>,
}

impl MigrationSet {
    /// Discover migrations directly under `dir` (non-recursive).
    ///
    /// Files that do not follow the naming convention are ignored. Two
    /// scripts with the same version and direction are an error.
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut set = Self::default();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(parsed) = MigrationFile::parse(name) else {
                log::debug!("Ignoring non-migration file {}", name);
                continue;
            };
            set.insert(parsed, entry.path())?;
        }

        Ok(set)
    }

    /// Register a script; fails if the version already has one for its direction
    pub fn insert(&mut self, file: MigrationFile, path: PathBuf) -> CoreResult<()> {
        let scripts = match self.scripts.entry(file.version) {
            Entry::Vacant(slot) => slot.insert(VersionScripts {
                identifier: file.identifier.clone(),
                ..Default::default()
            }),
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let slot = match file.direction {
            Direction::Up => &mut scripts.up,
            Direction::Down => &mut scripts.down,
        };
        if let Some(existing) = slot {
            return Err(CoreError::DuplicateMigration {
                version: file.version,
                direction: file.direction.to_string(),
                first: existing.display().to_string(),
                second: path.display().to_string(),
            });
        }
        *slot = Some(path);
        Ok(())
    }

    /// Number of distinct versions
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Whether no migrations were found
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// All versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = u64> + '_ {
        self.scripts.keys().copied()
    }

    /// Lowest version
    pub fn first(&self) -> Option<u64> {
        self.scripts.keys().next().copied()
    }

    /// Highest version
    pub fn last(&self) -> Option<u64> {
        self.scripts.keys().next_back().copied()
    }

    /// Smallest version strictly greater than `version`
    pub fn next(&self, version: u64) -> Option<u64> {
        use std::ops::Bound::{Excluded, Unbounded};
        self.scripts
            .range((Excluded(version), Unbounded))
            .next()
            .map(|(v, _)| *v)
    }

    /// Largest version strictly smaller than `version`
    pub fn prev(&self, version: u64) -> Option<u64> {
        self.scripts.range(..version).next_back().map(|(v, _)| *v)
    }

    /// Whether `version` has any script
    pub fn contains(&self, version: u64) -> bool {
        self.scripts.contains_key(&version)
    }

    /// Up descriptor for `version`, if an up script exists
    pub fn up(&self, version: u64) -> Option<Migration> {
        self.descriptor(version, Direction::Up)
    }

    /// Down descriptor for `version`, if a down script exists
    pub fn down(&self, version: u64) -> Option<Migration> {
        self.descriptor(version, Direction::Down)
    }

    fn descriptor(&self, version: u64, direction: Direction) -> Option<Migration> {
        let scripts = self.scripts.get(&version)?;
        let path = match direction {
            Direction::Up => scripts.up.as_ref(),
            Direction::Down => scripts.down.as_ref(),
        }?;
        Some(Migration {
            version,
            identifier: scripts.identifier.clone(),
            direction,
            path: path.clone(),
        })
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
