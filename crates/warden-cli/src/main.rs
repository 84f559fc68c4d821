//! Warden operator CLI
//!
//! Validates council configuration and replays recovery scripts against an
//! in-memory owner driven by a simulated clock.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod script;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden - guardian council recovery tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file and list its councils
    Check {
        /// Path to warden.toml
        config: PathBuf,
    },

    /// Run a JSON recovery script against the configured councils
    Replay {
        /// Path to warden.toml
        config: PathBuf,

        /// Path to the JSON step list
        script: PathBuf,

        /// Simulated clock start (ms since epoch)
        #[arg(long, default_value = "0")]
        start_ms: u64,

        /// Stop at the first rejected step and exit with an error
        #[arg(long)]
        fail_fast: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { config } => commands::check::run(&config),
        Commands::Replay {
            config,
            script,
            start_ms,
            fail_fast,
        } => commands::replay::run(&config, &script, start_ms, fail_fast),
    }
}
