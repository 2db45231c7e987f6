//! Encrypted blob.
//!
//! The object stored per encryption key: KMS ciphertext plus the resource
//! name of the key version that produced it. On the wire it is JSON wrapped
//! in base64, the same layout the bucket objects have always had.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::domain::version_id_from_path;
use crate::core::types::VersionId;
use crate::error::{Result, TransportError};

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Ciphertext of one key group's secret values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// Base64 KMS ciphertext
    pub ciphertext: String,
    /// Resource name of the producing key version
    pub name: String,
}

impl EncryptedBlob {
    /// Wrap raw KMS ciphertext.
    pub fn new(ciphertext: &[u8], version_name: impl Into<String>) -> Self {
        Self {
            ciphertext: B64.encode(ciphertext),
            name: version_name.into(),
        }
    }

    /// Raw ciphertext bytes.
    pub fn ciphertext_bytes(&self, key: &str) -> Result<Vec<u8>> {
        B64.decode(&self.ciphertext)
            .map_err(|_| TransportError::malformed("ciphertext decode", key, &self.ciphertext).into())
    }

    /// Version that produced this blob, if the name carries one.
    pub fn version(&self) -> Option<VersionId> {
        version_id_from_path(&self.name)
    }

    /// Serialize to the stored object body.
    pub fn seal(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)
            .map_err(|e| crate::error::Error::Other(format!("failed to serialize blob: {}", e)))?;
        Ok(B64.encode(json).into_bytes())
    }

    /// Parse a stored object body.
    ///
    /// Anything that is not base64 JSON with a `ciphertext` field is a
    /// transport error carrying the raw body.
    pub fn open(key: &str, body: &[u8]) -> Result<Self> {
        let malformed = || TransportError::malformed("secrets object", key, String::from_utf8_lossy(body));

        let trimmed: Vec<u8> = body
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let json = B64.decode(trimmed).map_err(|_| malformed())?;
        let blob: Self = serde_json::from_slice(&json).map_err(|_| malformed())?;
        if blob.ciphertext.is_empty() {
            return Err(malformed().into());
        }
        Ok(blob)
    }
}
