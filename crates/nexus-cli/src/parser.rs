//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the nexus development orchestrator.
#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Run the engine, app and frontend of a nexus project together")]
#[command(version)]
pub struct Cli {
    /// Topology file to use instead of ./nexus.config.toml
    #[arg(long = "config", global = true, env = "NEXUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
