//! CLI command definitions
//!
//! Defines the clap commands for the expense E2E harness.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the journey against a live server (default)
    Run(RunArgs),

    /// Print the step plan without sending any traffic
    Steps {
        /// YAML scenario to plan instead of the built-in journey
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Leave out the post-delete verification step
        #[arg(long)]
        skip_delete_check: bool,
    },

    /// Show where the config file is looked up
    ConfigPath,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Root URL of the expense API (e.g. http://localhost:8080/api)
    #[arg(long)]
    pub base_url: Option<String>,

    /// YAML scenario to run instead of the built-in journey
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Leave out the post-delete verification step
    #[arg(long)]
    pub skip_delete_check: bool,

    /// Show debug logs and raw responses of failed steps
    #[arg(long, short)]
    pub verbose: bool,
}

impl Commands {
    /// Whether the command asks for verbose output
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Run(args) => args.verbose,
            Commands::Steps { .. } | Commands::ConfigPath => false,
        }
    }
}
