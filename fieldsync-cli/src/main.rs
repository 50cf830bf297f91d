// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! FieldSync CLI - read and write FieldSync backend objects from the command line.
//!
//! # Examples
//!
//! ```bash
//! # List entity kinds
//! fieldsync kinds
//!
//! # Fetch one task
//! fieldsync get task 1700x42
//!
//! # Open tasks in a project, newest due date first
//! fieldsync list task --where project=p1 --where status=open --sort due_date --desc
//!
//! # Every inventory item, 50 per page
//! fieldsync list "inventory item" --all --limit 50
//!
//! # Create, patch and soft-delete
//! fieldsync create task '{"title": "Replace valve"}'
//! fieldsync patch task 1700x42 --set priority=2
//! fieldsync delete task 1700x42 --soft
//! ```

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fieldsync_fetch::{NetworkCause, SyncError};
use fieldsync_repo::user_message;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{Session, config as config_cmd, kinds, read, write};
use config::Config;

// ============================================================================
// CLI Definition
// ============================================================================

/// FieldSync CLI - FieldSync backend access.
#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(about = "Read and write FieldSync backend objects")]
#[command(long_about = r#"
FieldSync reads and writes objects on the FieldSync backend.

The bearer token is read from FIELDSYNC_TOKEN (or the config file) and the
backend address from FIELDSYNC_BASE_URL, --base-url or the config file.

Examples:
  fieldsync kinds                              # Entity kinds and paths
  fieldsync get task 1700x42                   # One object
  fieldsync list task --where project=p1       # First page of a query
  fieldsync list task --all                    # Every page
  fieldsync patch task 1700x42 --set priority=2
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Verbose output (debug logs and error details).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (no logs, no error text).
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List entity kinds and their collection paths.
    Kinds,

    /// Fetch objects by id.
    Get(read::GetArgs),

    /// Query a collection.
    #[command(visible_alias = "ls")]
    List(read::ListArgs),

    /// Create an object.
    Create(write::CreateArgs),

    /// Update fields of an object.
    Patch(write::PatchArgs),

    /// Delete an object.
    #[command(visible_alias = "rm")]
    Delete(write::DeleteArgs),

    /// Trigger a backend workflow.
    Workflow(write::WorkflowArgs),

    /// Manage configuration.
    Config(config_cmd::ConfigArgs),
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Missing or rejected credentials.
    Unauthorized = 2,
    /// Backend unreachable or timed out.
    Network = 3,
    /// Interrupted by the user.
    Cancelled = 130,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SyncError>() {
            Some(SyncError::Unauthorized) => Self::Unauthorized,
            Some(SyncError::NetworkError(NetworkCause::Cancelled)) => Self::Cancelled,
            Some(SyncError::NetworkError(_)) => Self::Network,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("fieldsync=debug,info")
    } else {
        EnvFilter::new("fieldsync=warn")
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

// ============================================================================
// Main Entry Point
// ============================================================================

/// Resolves configuration: file, then environment, then flags.
fn load_config(cli: &Cli) -> Result<(Config, PathBuf)> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from(&path)?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(url) = &cli.base_url {
        config.client.base_url.clone_from(url);
    }
    Ok((config, path))
}

async fn run(cli: &Cli) -> Result<()> {
    let (config, path) = load_config(cli)?;

    match &cli.command {
        Commands::Kinds => kinds::run(cli),
        Commands::Config(args) => config_cmd::run(args, &config, &path, cli),
        command => {
            let session = Session::connect(&config)?;
            match command {
                Commands::Get(args) => read::get(args, &session, cli).await,
                Commands::List(args) => read::list(args, &session, cli).await,
                Commands::Create(args) => write::create(args, &session, cli).await,
                Commands::Patch(args) => write::patch(args, &session).await,
                Commands::Delete(args) => write::delete(args, &session).await,
                Commands::Workflow(args) => write::workflow(args, &session).await,
                Commands::Kinds | Commands::Config(_) => Ok(()),
            }
        }
    }
}

/// Prints a failed command's error to stderr.
fn report(err: &anyhow::Error, verbose: bool) {
    match err.downcast_ref::<SyncError>() {
        Some(sync) => {
            eprintln!("Error: {}", user_message(sync));
            if verbose {
                eprintln!("  detail: {sync}");
            }
        }
        None => eprintln!("Error: {err:#}"),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli).await {
        if !cli.quiet {
            report(&e, cli.verbose);
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    std::process::exit(ExitCode::Success as i32);
}
