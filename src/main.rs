//! Strongbox - KMS-backed secrets for infrastructure modules.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strongbox::cli::output;
use strongbox::cli::{execute, Cli};
use strongbox::error::{ConfigError, Error, ManifestError};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `export` output stays clean.
    let filter = EnvFilter::try_from_env("STRONGBOX_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("strongbox=debug")
        } else {
            EnvFilter::new("strongbox=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli.command, &cli.config) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let suggestion = match &e {
                Error::Config(ConfigError::MissingField { field: "project.id" }) => {
                    Some("set [project] id in strongbox.toml or export TF_VAR_project_id")
                }
                Error::Manifest(ManifestError::UnknownEncryptionKeys { .. }) => {
                    Some("add the keys to the encryption key config, then run: strongbox check")
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Error::Transport(transport) = &e {
                let response = transport.response().trim();
                if !response.is_empty() {
                    output::detail("Response from API was:", response);
                }
            }
            if let Some(hint) = suggestion {
                output::hint(hint);
            }
            std::process::exit(1);
        }
    }
}
