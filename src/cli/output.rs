//! Shared CLI output helpers.
//!
//! Status lines go to stderr; stdout is reserved for command output that
//! callers may `eval` or parse.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Cyan: keys, hints
//! - Dimmed: secondary info

use console::style;
use std::fmt::Display;
use std::io::{self, Write as IoWrite};

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ 3 modules valid`
pub fn success(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✓").green(), msg);
    } else {
        eprintln!("✓ {}", msg);
    }
}

/// Print an error message (red).
///
/// Example: `✗ encryption keys "couchdb" not present in config.yaml`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a hint message (cyan).
///
/// Example: `→ run: strongbox check`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a label followed by an indented block, e.g. a raw API response.
pub fn detail(label: &str, body: &str) {
    if colors_enabled() {
        eprintln!("  {}", style(label).dim());
    } else {
        eprintln!("  {}", label);
    }
    for line in body.lines() {
        eprintln!("    {}", line);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  default  fetched 4 secrets`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        eprintln!("  {}  {}", style(label).dim(), style(value).bold());
    } else {
        eprintln!("  {}  {}", label, value);
    }
}

/// Format a key name in cyan.
pub fn key(k: &str) -> String {
    if colors_enabled() {
        style(k).cyan().to_string()
    } else {
        k.to_string()
    }
}

/// Start a progress line in the format `Label... `.
///
/// Call `progress_done()` to finish the line.
pub fn progress(label: &str) {
    if colors_enabled() {
        eprint!("{}... ", style(label).dim());
    } else {
        eprint!("{}... ", label);
    }
    let _ = io::stderr().flush();
}

/// Finish a progress line with success/failure indicator.
pub fn progress_done(success: bool) {
    if colors_enabled() {
        if success {
            eprintln!("{}", style("ok").green());
        } else {
            eprintln!("{}", style("failed").red());
        }
    } else {
        eprintln!("{}", if success { "ok" } else { "failed" });
    }
}
