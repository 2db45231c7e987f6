//! Run command.
//!
//! Executes a command with resolved secrets injected as environment variables.

use std::path::Path;

use crate::cli::resolve::Workspace;
use crate::core::env::Exported;
use crate::error::Result;

/// Run a command with secrets injected, returning its exit code.
pub fn execute(config: &Path, rotate_secrets: bool, command: &[String]) -> Result<i32> {
    if command.is_empty() {
        return Err(crate::error::Error::Other(
            "no command specified".to_string(),
        ));
    }

    let env = Workspace::load(config)?.resolve(rotate_secrets)?;
    run_with_env(&env, command)
}

fn run_with_env(env: &Exported, command: &[String]) -> Result<i32> {
    let mut cmd = std::process::Command::new(&command[0]);
    cmd.args(&command[1..]);

    // Values stay in Zeroizing buffers owned by `env`.
    for (name, value) in env.vars() {
        cmd.env(name, value);
    }

    let status = cmd.status()?;
    // A child killed by a signal has no code
    Ok(status.code().unwrap_or(1))
}
