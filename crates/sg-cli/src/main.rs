//! SchemaGuard CLI - checkpointed schema migrations with dirty-state recovery

use clap::Parser;
use std::process;

mod cli;
mod commands;

use cli::Cli;
use commands::{common, mirror, prune, recover, status, sync, up};

#[tokio::main]
async fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Recover => recover::execute(&cli.global).await,
        cli::Commands::Up(args) => up::execute(args, &cli.global).await,
        cli::Commands::Sync(args) => sync::execute(args, &cli.global).await,
        cli::Commands::Prune(args) => prune::execute(args, &cli.global).await,
        cli::Commands::Mirror => mirror::execute(&cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<common::ExitCode>() {
            Some(code) => process::ExitCode::from(u8::try_from(code.0).unwrap_or(1)),
            None => {
                eprintln!("Error: {:#}", err);
                process::ExitCode::FAILURE
            }
        },
    }
}

/// `info` by default, `debug` with --verbose; RUST_LOG wins over both
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
