//! Mirror command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::{build_reconciler, load_project};

/// Execute the mirror command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let reconciler = build_reconciler(&project);

    let Some(destination) = reconciler.destination() else {
        println!("No dest_dir configured, nothing to mirror");
        return Ok(());
    };

    let report = reconciler.mirror().context("Mirror failed")?;
    println!(
        "Copied {} file{} into {}",
        report.copied.len(),
        if report.copied.len() == 1 { "" } else { "s" },
        destination.display()
    );
    if global.verbose {
        for name in &report.copied {
            println!("  {}", name);
        }
    }
    if !report.failed.is_empty() {
        eprintln!("Failed to copy: {}", report.failed.join(", "));
    }
    Ok(())
}
