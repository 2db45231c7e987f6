//! Configuration file management.
//!
//! Handles reading and validating `strongbox.toml`. The file is optional:
//! every field has a default matching the conventional repository layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Project configuration stored in `strongbox.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub kms: KmsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub compat: CompatConfig,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Cloud project settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project id; falls back to `TF_VAR_project_id`
    #[serde(default)]
    pub id: Option<String>,
}

/// KMS key ring coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmsConfig {
    #[serde(default = "default_keyring")]
    pub keyring: String,
    #[serde(default = "default_location")]
    pub location: String,
}

/// Where manifests and the key allow-list live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_modules")]
    pub modules: PathBuf,
    #[serde(default = "default_key_config")]
    pub key_config: PathBuf,
}

/// Blob storage backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `gcs` or `fs`
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Root directory for the `fs` backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

/// Workarounds for external tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatConfig {
    /// Export `GOOGLE_ENCRYPTION_KEY` from `key_tfstate_encryption_key`
    #[serde(default = "default_true")]
    pub google_encryption_key: bool,
}

/// Storage backend named in the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Gcs,
    Filesystem(PathBuf),
}

fn default_keyring() -> String {
    constants::KMS_KEYRING.to_string()
}

fn default_location() -> String {
    constants::KMS_LOCATION.to_string()
}

fn default_modules() -> PathBuf {
    PathBuf::from(constants::MODULES_DIR)
}

fn default_key_config() -> PathBuf {
    PathBuf::from(constants::KEY_CONFIG_FILE)
}

fn default_backend() -> String {
    "gcs".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(constants::FS_STORE_DIR)
}

fn default_true() -> bool {
    true
}

impl Default for KmsConfig {
    fn default() -> Self {
        Self {
            keyring: default_keyring(),
            location: default_location(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            modules: default_modules(),
            key_config: default_key_config(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            google_encryption_key: true,
        }
    }
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults, rooted at the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or a validation
    /// error from [`Config::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
            toml::from_str::<Self>(&contents).map_err(ConfigError::Parse)?
        } else {
            debug!("no config file, using defaults");
            Self::default()
        };

        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, rooted at `base_dir`.
    pub fn from_toml(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration contents
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on empty names or an unknown backend.
    pub fn validate(&self) -> Result<()> {
        if self.kms.keyring.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "kms.keyring",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.kms.location.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "kms.location",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if matches!(&self.project.id, Some(id) if id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "project.id",
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        self.store_backend()?;
        Ok(())
    }

    /// Project id from the config, else from `TF_VAR_project_id`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if neither is set.
    pub fn project_id(&self) -> Result<String> {
        if let Some(id) = &self.project.id {
            return Ok(id.clone());
        }
        match std::env::var(constants::PROJECT_ID_VAR) {
            Ok(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(ConfigError::MissingField { field: "project.id" }.into()),
        }
    }

    /// Directory scanned for module manifests
    pub fn modules_dir(&self) -> PathBuf {
        self.base_dir.join(&self.paths.modules)
    }

    /// Path of the encryption key allow-list
    pub fn key_config_path(&self) -> PathBuf {
        self.base_dir.join(&self.paths.key_config)
    }

    /// Configured storage backend
    pub fn store_backend(&self) -> Result<StoreBackend> {
        match self.store.backend.as_str() {
            "gcs" => Ok(StoreBackend::Gcs),
            "fs" => Ok(StoreBackend::Filesystem(self.base_dir.join(&self.store.path))),
            other => Err(ConfigError::InvalidValue {
                field: "store.backend",
                reason: format!("unknown backend '{}'. Supported: gcs, fs", other),
            }
            .into()),
        }
    }
}
