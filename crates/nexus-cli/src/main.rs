//! CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use nexus_cli::{Cli, Commands, bootstrap, handlers};
use nexus_core::{LogLine, LogSink, ServiceLabel};
use nexus_runtime::ConsoleSink;

#[tokio::main]
async fn main() -> ExitCode {
    // .env joins the environment every child inherits
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    bootstrap::init_tracing(cli.verbose);

    let sink: Arc<dyn LogSink> = Arc::new(ConsoleSink::new());

    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    let result = match command {
        Commands::Dev => handlers::dev::execute(cli.config.as_deref(), Arc::clone(&sink)).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            sink.emit(LogLine::error(ServiceLabel::Nexus, e.to_string()));
            ExitCode::from(e.exit_code())
        }
    }
}
