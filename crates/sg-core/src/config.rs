//! Configuration types and parsing for schemaguard.yml

use crate::error::{CoreError, CoreResult};
use crate::migration::parse_version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Primary config file name looked up in a project directory
pub const CONFIG_FILE_NAME: &str = "schemaguard.yml";

/// Alternate extension accepted by [`Config::load_from_dir`]
const CONFIG_FILE_NAME_ALT: &str = "schemaguard.yaml";

/// Environment variable that overrides the configured target version
pub const TARGET_VERSION_ENV: &str = "SG_TARGET_VERSION";

/// Main project configuration from schemaguard.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Canonical, read-only directory of migration scripts
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Working directory the engine reads from.
    ///
    /// When unset, checkpointing and reconciliation become no-ops.
    #[serde(default)]
    pub dest_dir: Option<String>,

    /// Version store connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Bounded buffer size for the migration stream
    #[serde(default = "default_prefetch_migrations")]
    pub prefetch_migrations: usize,

    /// Version the working directory and schema should converge on
    #[serde(default)]
    pub target_version: Option<u64>,

    /// Paths excluded while mirroring
    #[serde(default)]
    pub mirror: MirrorConfig,
}

/// Version store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Table tracking the applied version
    #[serde(default = "default_migrations_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            table: default_migrations_table(),
        }
    }
}

/// Exclusions applied when mirroring the source tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    /// Directory name skipped along with everything beneath it
    #[serde(default = "default_exclude_dir")]
    pub exclude_dir: String,

    /// Marker file never copied into the working directory
    #[serde(default = "default_current_file")]
    pub current_file: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            exclude_dir: default_exclude_dir(),
            current_file: default_current_file(),
        }
    }
}

fn default_source_dir() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    "target/schemaguard.duckdb".to_string()
}

fn default_migrations_table() -> String {
    "schema_migrations".to_string()
}

fn default_prefetch_migrations() -> usize {
    10
}

fn default_exclude_dir() -> String {
    "tests".to_string()
}

fn default_current_file() -> String {
    "current.sql".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            dest_dir: None,
            database: DatabaseConfig::default(),
            prefetch_migrations: default_prefetch_migrations(),
            target_version: None,
            mirror: MirrorConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for schemaguard.yml or schemaguard.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join(CONFIG_FILE_NAME);
        let yaml_path = dir.join(CONFIG_FILE_NAME_ALT);

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.prefetch_migrations == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "prefetch_migrations must be a positive integer".to_string(),
            });
        }

        if self.source_dir.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "source_dir cannot be empty".to_string(),
            });
        }

        if self.mirror.exclude_dir.is_empty() || self.mirror.current_file.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "mirror.exclude_dir and mirror.current_file cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get absolute source directory relative to a project root
    pub fn source_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.source_dir)
    }

    /// Get absolute destination directory relative to a project root
    pub fn dest_dir_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.dest_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| root.join(d))
    }

    /// Get the database path, leaving `:memory:` untouched
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }

    /// Resolve the target version
    ///
    /// Priority: CLI flag > SG_TARGET_VERSION env var > config file
    pub fn resolve_target_version(&self, cli_target: Option<u64>) -> CoreResult<Option<u64>> {
        if cli_target.is_some() {
            return Ok(cli_target);
        }

        match std::env::var(TARGET_VERSION_ENV) {
            Ok(raw) => parse_version(raw.trim())
                .map(Some)
                .map_err(|e| CoreError::ConfigInvalid {
                    message: format!(
                        "{} must be an unsigned integer, got '{}': {}",
                        TARGET_VERSION_ENV, raw, e
                    ),
                }),
            Err(_) => Ok(self.target_version),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
