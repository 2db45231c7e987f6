//! Google Cloud KMS backend.
//!
//! Talks to Cloud KMS through the gcloud CLI. Enable with `--features gcp`.
//!
//! ## Requirements
//!
//! - `gcloud` CLI must be installed and authenticated
//! - The caller needs `cloudkms.cryptoKeyVersions.useToEncrypt`/`useToDecrypt`
//!   and, for rotation, `cloudkms.cryptoKeyVersions.create`/`update`
//!
//! Keys live in `projects/<project>/locations/<location>/keyRings/<keyring>`.

use serde::Deserialize;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

use super::KeyManagementClient;
use crate::core::domain::{version_id_from_path, KeyVersion, KeyVersionState};
use crate::core::types::VersionId;
use crate::error::{Result, TransportError};

/// Cloud KMS key ring accessed via gcloud
#[derive(Debug, Clone)]
pub struct GcloudKms {
    project: String,
    location: String,
    keyring: String,
}

#[derive(Debug, Deserialize)]
struct CryptoKey {
    primary: NamedVersion,
}

#[derive(Debug, Deserialize)]
struct NamedVersion {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    name: String,
    state: KeyVersionState,
}

impl GcloudKms {
    /// Create a client for one key ring
    pub fn new(project: String, location: String, keyring: String) -> Self {
        Self {
            project,
            location,
            keyring,
        }
    }

    /// Check if gcloud CLI is available
    fn check_gcloud(operation: &'static str, key: &str) -> Result<()> {
        which::which("gcloud").map_err(|_| TransportError::Command {
            operation,
            key: key.to_string(),
            response: "gcloud CLI not found. Install it from https://cloud.google.com/sdk/docs/install"
                .to_string(),
        })?;
        Ok(())
    }

    /// Key ring coordinates shared by every `gcloud kms` call
    fn scope(&self) -> [&str; 6] {
        [
            "--project",
            self.project.as_str(),
            "--location",
            self.location.as_str(),
            "--keyring",
            self.keyring.as_str(),
        ]
    }

    /// Run `gcloud kms ...`, feeding `stdin` if given, and return stdout.
    fn run(
        &self,
        operation: &'static str,
        key: &str,
        args: &[&str],
        stdin: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        Self::check_gcloud(operation, key)?;

        let mut cmd = Command::new("gcloud");
        cmd.arg("kms")
            .args(args)
            .args(self.scope())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        debug!(key, operation, "running gcloud kms");
        let spawn_failed = |e: std::io::Error| TransportError::Command {
            operation,
            key: key.to_string(),
            response: format!("failed to run gcloud: {}", e),
        };
        let mut child = cmd.spawn().map_err(spawn_failed)?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            pipe.write_all(input).map_err(spawn_failed)?;
        }

        let output = child.wait_with_output().map_err(spawn_failed)?;
        if !output.status.success() {
            return Err(TransportError::Command {
                operation,
                key: key.to_string(),
                response: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .into());
        }

        Ok(output.stdout)
    }

    fn run_json<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        key: &str,
        args: &[&str],
    ) -> Result<T> {
        let stdout = self.run(operation, key, args, None)?;
        serde_json::from_slice(&stdout).map_err(|_| {
            TransportError::malformed(operation, key, String::from_utf8_lossy(&stdout)).into()
        })
    }

    fn version_of(operation: &'static str, key: &str, name: &str) -> Result<VersionId> {
        version_id_from_path(name).ok_or_else(|| TransportError::malformed(operation, key, name).into())
    }
}

impl KeyManagementClient for GcloudKms {
    fn primary_version(&self, key: &str) -> Result<VersionId> {
        let described: CryptoKey = self.run_json(
            "get primary key version",
            key,
            &["keys", "describe", key, "--format", "json"],
        )?;
        Self::version_of("get primary key version", key, &described.primary.name)
    }

    fn version_name(&self, key: &str, version: &str) -> String {
        format!(
            "projects/{}/locations/{}/keyRings/{}/cryptoKeys/{}/cryptoKeyVersions/{}",
            self.project, self.location, self.keyring, key, version
        )
    }

    fn encrypt(&self, key: &str, version: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        trace!(key, version, plaintext_len = plaintext.len(), "encrypting with GCP KMS");
        let ciphertext = self.run(
            "encrypt",
            key,
            &[
                "encrypt",
                "--key",
                key,
                "--version",
                version,
                "--plaintext-file",
                "-",
                "--ciphertext-file",
                "-",
            ],
            Some(plaintext),
        )?;
        trace!(ciphertext_len = ciphertext.len(), "encrypted with GCP KMS");
        Ok(ciphertext)
    }

    fn decrypt(&self, key: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        trace!(key, ciphertext_len = ciphertext.len(), "decrypting with GCP KMS");
        self.run(
            "decrypt",
            key,
            &[
                "decrypt",
                "--key",
                key,
                "--ciphertext-file",
                "-",
                "--plaintext-file",
                "-",
            ],
            Some(ciphertext),
        )
    }

    fn create_version(&self, key: &str) -> Result<VersionId> {
        let created: NamedVersion = self.run_json(
            "create key version",
            key,
            &[
                "keys", "versions", "create", "--key", key, "--primary", "--format", "json",
            ],
        )?;
        Self::version_of("create key version", key, &created.name)
    }

    fn list_versions(&self, key: &str) -> Result<Vec<KeyVersion>> {
        let primary = self.primary_version(key)?;
        let listed: Vec<VersionInfo> = self.run_json(
            "list key versions",
            key,
            &["keys", "versions", "list", "--key", key, "--format", "json"],
        )?;

        listed
            .into_iter()
            .map(|v| {
                let id = Self::version_of("list key versions", key, &v.name)?;
                Ok(KeyVersion {
                    is_primary: id == primary,
                    id,
                    state: v.state,
                })
            })
            .collect()
    }

    fn disable_version(&self, key: &str, version: &str) -> Result<KeyVersionState> {
        #[derive(Deserialize)]
        struct Disabled {
            state: KeyVersionState,
        }

        let disabled: Disabled = self.run_json(
            "disable key version",
            key,
            &[
                "keys", "versions", "disable", version, "--key", key, "--format", "json",
            ],
        )?;
        Ok(disabled.state)
    }
}
