//! DuckDB migration engine implementation

use crate::error::{DbError, DbResult};
use crate::traits::{MigrationEngine, Notice, StreamItem, TrackedVersion, NIL_VERSION};
use async_trait::async_trait;
use duckdb::Connection;
use sg_core::{Migration, MigrationSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Default name of the version tracking table
pub const DEFAULT_MIGRATIONS_TABLE: &str = "schema_migrations";

/// DuckDB-backed migration engine
///
/// Scripts are read from `migrations_dir` on every call, so changes made by
/// the reconciler are picked up without reopening the engine.
pub struct DuckDbEngine {
    conn: Mutex<Connection>,
    migrations_dir: PathBuf,
    table: String,
}

impl DuckDbEngine {
    /// Create a new in-memory DuckDB engine
    pub fn in_memory(migrations_dir: &Path) -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::init(conn, migrations_dir)
    }

    /// Create a new DuckDB engine from a file path
    pub fn from_path(path: &Path, migrations_dir: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::init(conn, migrations_dir)
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str, migrations_dir: &Path) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory(migrations_dir)
        } else {
            Self::from_path(Path::new(path), migrations_dir)
        }
    }

    /// Track versions in a differently named table
    pub fn with_table(mut self, table: &str) -> DbResult<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DbError::ExecutionError(format!(
                "invalid migrations table name '{}'",
                table
            )));
        }
        self.table = table.to_string();
        self.ensure_table()?;
        Ok(self)
    }

    fn init(conn: Connection, migrations_dir: &Path) -> DbResult<Self> {
        let engine = Self {
            conn: Mutex::new(conn),
            migrations_dir: migrations_dir.to_path_buf(),
            table: DEFAULT_MIGRATIONS_TABLE.to_string(),
        };
        engine.ensure_table()?;
        Ok(engine)
    }

    /// Directory scripts are read from
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Name of the version tracking table
    pub fn table(&self) -> &str {
        &self.table
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn ensure_table(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (version BIGINT NOT NULL, dirty BOOLEAN NOT NULL)",
            self.table
        ))?;
        Ok(())
    }

    /// Re-read the migration directory
    pub fn discover(&self) -> DbResult<MigrationSet> {
        Ok(MigrationSet::discover(&self.migrations_dir)?)
    }

    /// Highest version available on disk
    pub fn latest(&self) -> DbResult<Option<u64>> {
        Ok(self.discover()?.last())
    }

    /// Read the tracked version synchronously
    fn version_sync(&self) -> DbResult<TrackedVersion> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT version, dirty FROM {} LIMIT 1",
            self.table
        ))?;
        let mut rows = stmt.query([])?;

        let tracked = match rows.next()? {
            Some(row) => {
                let version: i64 = row.get(0)?;
                let dirty: bool = row.get(1)?;
                TrackedVersion {
                    version: u64::try_from(version).ok(),
                    dirty,
                }
            }
            None => TrackedVersion::default(),
        };
        Ok(tracked)
    }

    /// Replace the tracked version synchronously
    ///
    /// A clean nil version leaves the table empty.
    fn set_version_sync(&self, version: i64, dirty: bool) -> DbResult<()> {
        if version < NIL_VERSION {
            return Err(DbError::InvalidVersion(version));
        }

        let insert = if version == NIL_VERSION && !dirty {
            String::new()
        } else {
            format!("INSERT INTO {} VALUES ({}, {});", self.table, version, dirty)
        };

        let conn = self.conn()?;
        conn.execute_batch(&format!(
            "BEGIN TRANSACTION; DELETE FROM {}; {} COMMIT;",
            self.table, insert
        ))
        .map_err(|e| {
            let _ = conn.execute_batch("ROLLBACK");
            DbError::from(e)
        })
    }

    /// Run one script; an empty script is a no-op
    fn run_script(&self, migration: &Migration) -> DbResult<()> {
        let script_failed = |message: String| DbError::ScriptFailed {
            version: migration.version,
            path: migration.path.display().to_string(),
            message,
        };

        let sql = std::fs::read_to_string(&migration.path)
            .map_err(|e| script_failed(e.to_string()))?;
        if sql.trim().is_empty() {
            return Ok(());
        }

        let conn = self.conn()?;
        conn.execute_batch(&sql).map_err(|e| script_failed(e.to_string()))
    }

    fn apply_up(&self, set: &MigrationSet, version: u64) -> DbResult<()> {
        let stored = stored_version(version)?;
        self.set_version_sync(stored, true)?;
        if let Some(migration) = set.up(version) {
            self.run_script(&migration)?;
            log::info!("Applied migration {}", migration);
        }
        self.set_version_sync(stored, false)
    }

    fn apply_down(&self, set: &MigrationSet, version: u64) -> DbResult<()> {
        let prev = set.prev(version).map_or(Ok(NIL_VERSION), stored_version)?;
        self.set_version_sync(prev, true)?;
        if let Some(migration) = set.down(version) {
            self.run_script(&migration)?;
            log::info!("Reverted migration {}", migration);
        }
        self.set_version_sync(prev, false)
    }

    /// Move the schema to `target`, applying up or down scripts in order.
    ///
    /// A failing script leaves the tracked version dirty and returns
    /// [`DbError::ScriptFailed`].
    pub async fn migrate_to(&self, target: u64) -> DbResult<()> {
        let set = self.discover()?;
        if !set.contains(target) {
            return Err(DbError::MigrationNotFound(target));
        }

        let current = self.version_sync()?;
        if current.dirty {
            return Err(DbError::Dirty(current.version.unwrap_or_default()));
        }

        match current.version {
            Some(cur) if cur == target => {
                log::info!("Schema already at version {}", target);
            }
            Some(cur) if cur > target => {
                let mut version = Some(cur);
                while let Some(v) = version.filter(|v| *v > target) {
                    self.apply_down(&set, v)?;
                    version = set.prev(v);
                }
            }
            current => {
                let mut version = match current {
                    Some(cur) => set.next(cur),
                    None => set.first(),
                };
                while let Some(v) = version.filter(|v| *v <= target) {
                    self.apply_up(&set, v)?;
                    version = set.next(v);
                }
            }
        }

        Ok(())
    }
}

/// Versions are stored as BIGINT; anything above `i64::MAX` has no row form
fn stored_version(version: u64) -> DbResult<i64> {
    i64::try_from(version).map_err(|_| DbError::VersionOutOfRange(version))
}

#[async_trait]
impl MigrationEngine for DuckDbEngine {
    async fn force(&self, version: i64) -> DbResult<()> {
        self.set_version_sync(version, false)
    }

    async fn version(&self) -> DbResult<TrackedVersion> {
        self.version_sync()
    }

    async fn read_migrations(&self, from: u64, to: u64, out: mpsc::Sender<StreamItem>) {
        let set = match self.discover() {
            Ok(set) => set,
            Err(e) => {
                let _ = out.send(StreamItem::Notice(Notice::Failed(e.to_string()))).await;
                return;
            }
        };

        if from >= to {
            let _ = out.send(StreamItem::Notice(Notice::NoChange)).await;
            return;
        }

        for version in set.versions().filter(|v| (from..to).contains(v)) {
            let Some(migration) = set.up(version) else {
                continue;
            };
            if out.send(StreamItem::Migration(migration)).await.is_err() {
                log::debug!("Migration stream consumer went away at version {}", version);
                return;
            }
        }
    }

    fn engine_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
