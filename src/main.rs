use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser};
use ignite::cli::{commands, Cli};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("failed to initialize tracing filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if cli.command.is_none() {
        Cli::command().print_help()?;
        std::process::exit(2);
    }

    info!("Starting ignite v{}", ignite::VERSION);

    commands::handle_command(cli).await?;
    Ok(())
}
