use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod db;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "supashift=debug"
    } else {
        "supashift=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Validate => commands::validate::run(config_path).await,
        Commands::Backup(args) => commands::backup::run(args, config_path).await,
        Commands::CleanDump(args) => commands::clean::run(args, config_path).await,
        Commands::ImportDb(args) => commands::import::run(args, config_path).await,
        Commands::Migrate(args) => commands::migrate::run(args, config_path).await,
    }
}
