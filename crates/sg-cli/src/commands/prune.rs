//! Prune command implementation

use anyhow::{Context, Result};
use sg_sync::PruneReport;

use crate::cli::{GlobalArgs, PruneArgs};
use crate::commands::common::{build_reconciler, load_project};

/// Execute the prune command
pub async fn execute(args: &PruneArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let reconciler = build_reconciler(&project);

    if reconciler.destination().is_none() {
        println!("No dest_dir configured, nothing to prune");
        return Ok(());
    }

    let report = reconciler.prune_above(args.target).context("Prune failed")?;
    print_prune_report(&report, args.target);
    Ok(())
}

/// Print a one-line prune summary plus any failures
pub(crate) fn print_prune_report(report: &PruneReport, target: u64) {
    println!(
        "Pruned {} script{} above version {}",
        report.deleted.len(),
        if report.deleted.len() == 1 { "" } else { "s" },
        target
    );
    if !report.skipped.is_empty() {
        println!("  Skipped (unparsable version): {}", report.skipped.join(", "));
    }
    if !report.failed.is_empty() {
        eprintln!("  Failed to delete: {}", report.failed.join(", "));
    }
}
