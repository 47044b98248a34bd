//! ThreadMirror command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ThreadMirror - topic-scoped message replication bridge
#[derive(Parser)]
#[command(name = "threadmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, env = "THREADMIRROR_CONFIG", default_value = "threadmirror.json5")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the replication bridge
    Run,

    /// Validate the configuration and exit
    Check,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run => commands::run_bridge(&cli.config).await,
        Commands::Check => commands::check(&cli.config),
        Commands::Version => {
            println!("threadmirror {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
