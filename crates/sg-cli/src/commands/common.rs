//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sg_core::Config;
use sg_db::DuckDbEngine;
use sg_sync::{Reconciler, Recovery};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs maps it to the process status without
        // printing anything.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A project directory together with its loaded configuration
#[derive(Debug)]
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    /// Directory the engine reads scripts from.
    ///
    /// This is the working directory when one is configured, otherwise the
    /// source tree itself.
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config
            .dest_dir_absolute(&self.root)
            .unwrap_or_else(|| self.config.source_dir_absolute(&self.root))
    }
}

/// Load the project from the global `--project-dir` / `--config` options
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project")?;

    Ok(Project { root, config })
}

/// Open the DuckDB version store configured for the project
pub(crate) fn open_engine(project: &Project) -> Result<Arc<DuckDbEngine>> {
    let db_path = project.config.database_path_absolute(&project.root);
    if db_path != ":memory:" {
        if let Some(parent) = Path::new(&db_path).parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let engine = DuckDbEngine::new(&db_path, &project.migrations_dir())
        .and_then(|engine| engine.with_table(&project.config.database.table))
        .context("Failed to connect to database")?;
    Ok(Arc::new(engine))
}

/// Recovery handle bound to the project's working directory
pub(crate) fn build_recovery(project: &Project, engine: Arc<DuckDbEngine>) -> Result<Recovery> {
    Recovery::new(
        engine,
        project.config.dest_dir_absolute(&project.root),
        project.config.prefetch_migrations,
    )
    .context("Failed to set up recovery")
}

/// Reconciler for the project's source and working directories
pub(crate) fn build_reconciler(project: &Project) -> Reconciler {
    Reconciler::from_config(&project.config, &project.root)
}

/// Run recovery, treating a missing checkpoint as clean state.
///
/// Returns the forced version when a checkpoint was consumed.
pub(crate) async fn recover_if_needed(recovery: &Recovery) -> Result<Option<i64>> {
    match recovery.recover().await {
        Ok(version) => Ok(Some(version)),
        Err(e) if e.is_not_found() => {
            log::debug!("No checkpoint to recover from: {}", e);
            Ok(None)
        }
        Err(e) => Err(e).context("Dirty-state recovery failed"),
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
