//! Check command.
//!
//! Validates every module manifest against the key allow-list without
//! touching KMS or storage.

use std::path::Path;

use crate::cli::output;
use crate::cli::resolve::Workspace;
use crate::core::context::ResolutionContext;
use crate::error::Result;

/// Validate manifests and print the secrets of each encryption key.
pub fn execute(config: &Path, json: bool) -> Result<i32> {
    let workspace = Workspace::load(config)?;
    let mut ctx = ResolutionContext::new();
    let groups = workspace.collect(&mut ctx)?;

    if json {
        let rendered = serde_json::to_string_pretty(&groups)
            .map_err(|e| crate::error::Error::Other(format!("failed to render JSON: {}", e)))?;
        println!("{}", rendered);
        return Ok(0);
    }

    for (key, secrets) in &groups {
        println!("{}", key);
        for secret in secrets {
            println!("  {}", secret);
        }
    }

    output::success(&format!(
        "{} modules valid, {} secrets across {} keys",
        workspace.modules.len(),
        ctx.len(),
        groups.len()
    ));
    Ok(0)
}
