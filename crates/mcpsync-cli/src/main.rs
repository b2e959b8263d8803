mod cli;
mod commands;
mod interactive;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Sync { source, force } => {
            commands::Sync::execute(source, *force).context("Failed to execute sync command")?;
        }
        Commands::Validate { source } => {
            commands::Validate::execute(source.as_deref())
                .context("Failed to execute validate command")?;
        }
        Commands::Apps => {
            commands::Apps::execute().context("Failed to execute apps command")?;
        }
        Commands::Watch { debounce, force } => {
            commands::Watch::execute(*debounce, *force)
                .context("Failed to execute watch command")?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
