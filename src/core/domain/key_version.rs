//! KMS key versions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::VersionId;

/// State of a key version as reported by the KMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyVersionState {
    Enabled,
    Disabled,
    /// Any state strongbox never sets itself (pending generation, destroyed, ...)
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for KeyVersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "ENABLED"),
            Self::Disabled => write!(f, "DISABLED"),
            Self::Other(state) => write!(f, "{}", state),
        }
    }
}

/// One version of an encryption key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVersion {
    pub id: VersionId,
    pub state: KeyVersionState,
    pub is_primary: bool,
}

impl KeyVersion {
    /// Whether this version can still encrypt and decrypt
    pub fn is_enabled(&self) -> bool {
        self.state == KeyVersionState::Enabled
    }
}

/// Extract the version id from a KMS resource path.
///
/// `projects/p/locations/global/keyRings/keyring/cryptoKeys/default/cryptoKeyVersions/3` → `3`
pub fn version_id_from_path(path: &str) -> Option<VersionId> {
    let last = path.rsplit('/').next()?;
    if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
        Some(last.to_string())
    } else {
        None
    }
}
