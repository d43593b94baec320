// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! nozzle - query datagrepper message history from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Latest messages from one user
//! nozzle --user sross
//!
//! # Two pages of git pushes, oldest first, as JSON
//! nozzle query --topic org.fedoraproject.prod.git.receive --order asc --pages 2 --format json
//!
//! # Show the request URL without sending it
//! nozzle url --package kernel --rows 50
//!
//! # Write a default config file
//! nozzle config init
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use datanozzle_fetch::FetchError;
use datanozzle_store::{Config, StoreError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, query};

// ============================================================================
// CLI Definition
// ============================================================================

/// nozzle - datagrepper message history client.
#[derive(Parser)]
#[command(name = "nozzle")]
#[command(about = "Query datagrepper message history")]
#[command(long_about = r#"
nozzle walks the paginated /raw endpoint of a datagrepper instance and
prints every matching message.

Examples:
  nozzle --user sross                 # Messages involving a user
  nozzle --package kernel --pages 2   # Two pages of kernel messages
  nozzle --format json --pretty       # JSON output
  nozzle url --topic org.fedoraproject.prod.git.receive
"#)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'query' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Query filters used when no subcommand is given.
    #[command(flatten)]
    pub query: query::QueryArgs,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// API root to query instead of the configured one.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch matching messages (default if no command specified).
    #[command(visible_alias = "q")]
    Query(query::QueryArgs),

    /// Print the first request URL without sending it.
    Url(query::QueryArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Bad arguments or configuration.
    Usage = 2,
    /// The server answered with something that could not be decoded.
    ParseError = 3,
    /// The server could not be reached or refused the request.
    Transport = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if let Some(fetch) = error.downcast_ref::<FetchError>() {
            return Self::for_fetch_error(fetch);
        }
        match error.downcast_ref::<StoreError>() {
            Some(StoreError::Fetch(fetch)) => Self::for_fetch_error(fetch),
            Some(_) => Self::Usage,
            None => Self::Error,
        }
    }

    fn for_fetch_error(error: &FetchError) -> Self {
        if error.is_transport() {
            Self::Transport
        } else if error.is_response_format() {
            Self::ParseError
        } else {
            Self::Usage
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("datanozzle=debug,info")
    } else {
        EnvFilter::try_new(format!("datanozzle={level}"))
            .unwrap_or_else(|_| EnvFilter::new("datanozzle=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Loads the config file named on the command line, or the default one.
pub fn load_config(cli: &Cli) -> Result<Config, StoreError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
        config.validate()?;
    }

    Ok(config)
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e}");
            }
            std::process::exit(ExitCode::Usage as i32);
        }
    };

    setup_logging(cli.verbose, cli.quiet, &config.log_level);

    let result = match &cli.command {
        Some(Commands::Query(args)) => query::run(args, &config, &cli),
        Some(Commands::Url(args)) => query::run_url(args, &config, &cli),
        Some(Commands::Config(args)) => config::run(args, &config, &cli),
        None => query::run(&cli.query, &config, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            let formatter = output::TextFormatter::new(!cli.no_color);
            eprintln!("{}", formatter.format_error(&format!("{e:#}")));
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }
}
