//! Export command.
//!
//! Resolves every secret and prints the environment for `eval`.

use std::path::Path;

use crate::cli::resolve::Workspace;
use crate::error::Result;

/// Print the resolved environment as shell `export` lines or JSON.
pub fn execute(config: &Path, rotate_secrets: bool, json: bool) -> Result<i32> {
    let env = Workspace::load(config)?.resolve(rotate_secrets)?;

    if json {
        println!("{}", env.to_json().as_str());
    } else {
        print!("{}", env.to_shell().as_str());
    }
    Ok(0)
}
