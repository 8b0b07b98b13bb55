//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sg_core::{CheckpointStore, NIL_VERSION};
use sg_db::MigrationEngine;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{load_project, open_engine};

/// Snapshot of the version store and working directory
#[derive(Debug, Serialize)]
pub(crate) struct StatusReport {
    pub(crate) engine: &'static str,
    pub(crate) version: Option<u64>,
    pub(crate) dirty: bool,
    pub(crate) latest: Option<u64>,
    pub(crate) checkpoint: Option<i64>,
    pub(crate) migrations_dir: String,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let engine = open_engine(&project)?;

    let tracked = engine
        .version()
        .await
        .context("Failed to read current version")?;
    let checkpoint = match project.config.dest_dir_absolute(&project.root) {
        Some(dir) => read_checkpoint(&CheckpointStore::in_dir(&dir))?,
        None => None,
    };

    let report = StatusReport {
        engine: engine.engine_type(),
        version: tracked.version,
        dirty: tracked.dirty,
        latest: engine.latest()?,
        checkpoint,
        migrations_dir: engine.migrations_dir().display().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn read_checkpoint(store: &CheckpointStore) -> Result<Option<i64>> {
    match store.read() {
        Ok(version) => Ok(Some(version)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to read checkpoint"),
    }
}

fn print_report(report: &StatusReport) {
    let version = report
        .version
        .map_or_else(|| "none".to_string(), |v| v.to_string());
    let latest = report
        .latest
        .map_or_else(|| "none".to_string(), |v| v.to_string());

    println!("Engine:      {}", report.engine);
    println!("Migrations:  {}", report.migrations_dir);
    println!(
        "Version:     {}{}",
        version,
        if report.dirty { " (dirty)" } else { "" }
    );
    println!("Latest:      {}", latest);
    match report.checkpoint {
        Some(NIL_VERSION) => println!("Checkpoint:  none applied (run `sg recover`)"),
        Some(v) => println!("Checkpoint:  {} (run `sg recover`)", v),
        None => println!("Checkpoint:  none"),
    }
}
