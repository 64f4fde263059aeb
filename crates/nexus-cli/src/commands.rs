//! Available subcommands.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start every service and stream their logs until Ctrl+C
    Dev,
}
