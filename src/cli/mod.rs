//! Command-line interface.

pub mod check;
pub mod completions;
pub mod export;
pub mod output;
pub mod resolve;
pub mod rotate;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::core::constants::CONFIG_FILE;

/// Strongbox - KMS-backed secrets for infrastructure modules.
#[derive(Parser)]
#[command(
    name = "strongbox",
    about = "KMS-backed secrets for infrastructure modules",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file
    #[arg(long, global = true, env = "STRONGBOX_CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Validate module manifests and show secrets grouped by key
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve all secrets and print them as environment variables
    Export {
        /// Push current values (generating missing ones) instead of fetching
        #[arg(long)]
        rotate_secrets: bool,
        /// Output as JSON instead of shell `export` lines
        #[arg(long)]
        json: bool,
    },

    /// Run a command with resolved secrets injected as env vars
    Run {
        /// Push current values (generating missing ones) instead of fetching
        #[arg(long)]
        rotate_secrets: bool,
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// Create a new primary version of a key and disable the old ones
    RotateKey {
        /// Encryption key name
        key: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command, returning the process exit code.
pub fn execute(command: Command, config: &Path) -> crate::error::Result<i32> {
    use Command::*;

    match command {
        Check { json } => check::execute(config, json),
        Export {
            rotate_secrets,
            json,
        } => export::execute(config, rotate_secrets, json),
        Run {
            rotate_secrets,
            command,
        } => run::execute(config, rotate_secrets, &command),
        RotateKey { key } => rotate::execute(config, &key),
        Completions { shell } => completions::execute(shell),
    }
}
