//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// SchemaGuard - checkpointed schema migrations with dirty-state recovery
#[derive(Parser, Debug)]
#[command(name = "sg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Force the schema back to the last recorded checkpoint
    Recover,

    /// Sync the working directory and migrate to the target version
    Up(UpArgs),

    /// Mirror the source tree, then prune above the target version
    Sync(SyncArgs),

    /// Delete working scripts above a version
    Prune(PruneArgs),

    /// Copy the source tree into the working directory
    Mirror,

    /// Show the tracked version and any pending checkpoint
    Status(StatusArgs),
}

/// Arguments for the up command
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Version to migrate to (default: SG_TARGET_VERSION, config, then latest)
    #[arg(short, long)]
    pub target: Option<u64>,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Version to prune above (default: SG_TARGET_VERSION, then config)
    #[arg(short, long)]
    pub target: Option<u64>,
}

/// Arguments for the prune command
#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Keep scripts at or below this version
    #[arg(short, long)]
    pub target: u64,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
