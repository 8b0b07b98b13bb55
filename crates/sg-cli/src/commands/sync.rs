//! Sync command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, SyncArgs};
use crate::commands::common::{build_reconciler, load_project};
use crate::commands::prune::print_prune_report;

/// Execute the sync command
pub async fn execute(args: &SyncArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let target = project.config.resolve_target_version(args.target)?;
    let reconciler = build_reconciler(&project);

    if reconciler.destination().is_none() {
        println!("No dest_dir configured, nothing to sync");
        return Ok(());
    }

    let report = reconciler.sync(target).context("Sync failed")?;
    println!(
        "Copied {} file{}",
        report.mirror.copied.len(),
        if report.mirror.copied.len() == 1 { "" } else { "s" }
    );
    match (report.prune.as_ref(), target) {
        (Some(prune), Some(target)) => print_prune_report(prune, target),
        _ => println!("No target version, prune skipped"),
    }
    Ok(())
}
