//! Config command - inspect and initialize configuration.

use std::path::Path;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::Cli;
use crate::config::Config;
use crate::output::JsonFormatter;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration, token redacted.
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, config: &Config, path: &Path, cli: &Cli) -> Result<()> {
    let out = JsonFormatter::new(cli.pretty);
    match &args.action {
        ConfigAction::Show => out.print(&config.redacted()),
        ConfigAction::Path => out.print(&json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        })),
        ConfigAction::Init { force } => init(path, *force),
    }
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Config::default().save_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        init(&path, false).unwrap();
        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
