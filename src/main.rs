//! expense-e2e - end-to-end verification for the expense service
//!
//! Runs the primary user journey against a live server and prints one
//! severity-tagged status line per step.

use clap::Parser;
use expense_e2e::commands::{Commands, RunArgs};
use expense_e2e::common::logging;
use expense_e2e::testing::{ConsoleReporter, Reporter};
use expense_e2e::cli;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "expense-e2e", about = "End-to-end checks for the expense API")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));

    logging::init_cli(command.verbose());

    match cli::dispatch(command).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "run terminated");
            ConsoleReporter::new(false).fatal(&e);
            ExitCode::FAILURE
        }
    }
}
