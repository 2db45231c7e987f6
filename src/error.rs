//! Error types.
//!
//! Every failure in strongbox is fatal for the run. Errors are grouped by the
//! stage that raises them and converge on [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Manifest collection and validation errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(
        "can not use secret '{secret}' for module '{module}': secret name must start with 'secret_' or 'key_'"
    )]
    InvalidPrefix { secret: String, module: String },

    #[error(
        "can not use secret '{secret}' for module '{module}': already in use by module '{owner}'"
    )]
    DuplicateSecret {
        secret: String,
        module: String,
        owner: String,
    },

    #[error("encryption keys \"{}\" not present in {}", keys.join(", "), config.display())]
    UnknownEncryptionKeys { keys: Vec<String>, config: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// `strongbox.toml` errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failure talking to the key-management service or the secret store.
///
/// Carries the raw response so the operator can see what the service said.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{operation} failed for key '{key}'")]
    Command {
        operation: &'static str,
        key: String,
        response: String,
    },

    #[error("{operation} failed for key '{key}': HTTP {status}")]
    Status {
        operation: &'static str,
        key: String,
        status: u16,
        response: String,
    },

    #[error("unable to parse {operation} response for key '{key}'")]
    Malformed {
        operation: &'static str,
        key: String,
        response: String,
    },
}

impl TransportError {
    /// Raw response payload from the remote side.
    pub fn response(&self) -> &str {
        match self {
            Self::Command { response, .. }
            | Self::Status { response, .. }
            | Self::Malformed { response, .. } => response,
        }
    }

    pub(crate) fn malformed(
        operation: &'static str,
        key: &str,
        response: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            operation,
            key: key.to_string(),
            response: response.into(),
        }
    }
}

/// Key rotation errors.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("unable to disable version {version} for key '{key}': state is {state}")]
    NotDisabled {
        key: String,
        version: String,
        state: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
