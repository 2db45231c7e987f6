//! Module type.
//!
//! A module declares the secrets it needs and, optionally, the encryption key
//! that protects them.

use serde::Deserialize;

use crate::core::types::{KeyName, ModuleName, SecretName};

/// On-disk shape of a module's `secrets.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleManifest {
    /// Declared secret names
    #[serde(default)]
    pub secrets: Vec<SecretName>,
    /// Encryption key; the module name is used when absent
    #[serde(default)]
    pub encryption_key: Option<KeyName>,
}

/// A module and its secret declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    name: ModuleName,
    declared_key: Option<KeyName>,
    secrets: Vec<SecretName>,
}

impl Module {
    /// Create a module from its parts
    pub fn new(
        name: impl Into<ModuleName>,
        declared_key: Option<KeyName>,
        secrets: Vec<SecretName>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_key,
            secrets,
        }
    }

    /// Create a module from a parsed manifest
    pub fn from_manifest(name: impl Into<ModuleName>, manifest: ModuleManifest) -> Self {
        Self::new(name, manifest.encryption_key, manifest.secrets)
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encryption key protecting this module's secrets.
    ///
    /// Falls back to the module name when none is declared.
    pub fn encryption_key(&self) -> &str {
        self.declared_key.as_deref().unwrap_or(&self.name)
    }

    /// Declared secret names, in manifest order
    pub fn secrets(&self) -> &[SecretName] {
        &self.secrets
    }
}
