//! Recover command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::{build_recovery, load_project, open_engine, recover_if_needed};

/// Execute the recover command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let engine = open_engine(&project)?;
    let recovery = build_recovery(&project, engine)?;

    match recover_if_needed(&recovery).await? {
        Some(version) => println!("Recovered: schema forced to version {}", version),
        None => println!("No checkpoint found, state is clean"),
    }
    Ok(())
}
