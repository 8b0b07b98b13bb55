//! Up command implementation
//!
//! Recovers from any checkpoint left by a previous failure, brings the
//! working directory in line with the source tree, then migrates. A failed
//! script records the last good version so the next run can recover.

use anyhow::{Context, Result};
use sg_db::{DbError, MigrationEngine};

use crate::cli::{GlobalArgs, UpArgs};
use crate::commands::common::{
    build_reconciler, build_recovery, load_project, open_engine, recover_if_needed, ExitCode,
};

/// Execute the up command
pub async fn execute(args: &UpArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let engine = open_engine(&project)?;
    let recovery = build_recovery(&project, engine.clone())?;

    if let Some(version) = recover_if_needed(&recovery).await? {
        println!("Recovered from checkpoint at version {}", version);
    }

    let configured_target = project.config.resolve_target_version(args.target)?;
    let reconciler = build_reconciler(&project);
    if reconciler.destination().is_some() {
        let report = reconciler
            .sync(configured_target)
            .context("Failed to sync migration directory")?;
        log::debug!(
            "Synced {} file(s), pruned {}",
            report.mirror.copied.len(),
            report.prune.map_or(0, |p| p.deleted.len())
        );
    }

    let target = match configured_target {
        Some(target) => target,
        None => match engine.latest()? {
            Some(latest) => latest,
            None => {
                println!("No migrations found in {}", engine.migrations_dir().display());
                return Ok(());
            }
        },
    };

    let before = engine
        .version()
        .await
        .context("Failed to read current version")?;

    match engine.migrate_to(target).await {
        Ok(()) => {
            println!("Schema at version {}", target);
            Ok(())
        }
        Err(err @ DbError::ScriptFailed { .. }) => {
            eprintln!("Migration failed: {}", err);
            // only an upward batch has a last good version to replay toward
            if !matches!(before.version, Some(known_good) if known_good >= target) {
                let failure_target = target.saturating_add(1);
                match recovery.record_failure(before.version, failure_target).await {
                    Ok(Some(version)) => {
                        eprintln!("Recorded last successful version {} for recovery", version)
                    }
                    Ok(None) => eprintln!("No dest_dir configured, checkpoint not written"),
                    Err(e) => eprintln!("Failed to record checkpoint: {}", e),
                }
            }
            Err(ExitCode(1).into())
        }
        Err(err) => Err(err).context(format!("Failed to migrate to version {}", target)),
    }
}
