//! In-memory KMS.
//!
//! Tracks key versions per key and "encrypts" by tagging plaintext with the
//! key and version that produced it. NOT cryptographically secure: it exists
//! to exercise the lifecycle and rotation plumbing without a cloud account.
//!
//! Ciphertext is self-describing, so blobs written by one process decrypt in
//! another as long as the producing version is still enabled there. Keys
//! spring into existence on first use with a single enabled primary version
//! `1`.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use super::KeyManagementClient;
use crate::core::domain::{KeyVersion, KeyVersionState};
use crate::core::types::{KeyName, VersionId};
use crate::error::{Result, TransportError};

const MAGIC: &str = "memkms";

#[derive(Debug, Clone)]
struct KeyState {
    versions: BTreeMap<u64, KeyVersionState>,
    primary: u64,
}

impl KeyState {
    fn fresh() -> Self {
        Self {
            versions: BTreeMap::from([(1, KeyVersionState::Enabled)]),
            primary: 1,
        }
    }
}

/// In-process key ring
#[derive(Debug, Default)]
pub struct MemoryKms {
    keys: RefCell<BTreeMap<KeyName, KeyState>>,
    stuck: RefCell<BTreeSet<(KeyName, VersionId)>>,
}

impl MemoryKms {
    /// Create an empty key ring
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the versions of `key`.
    ///
    /// `primary` must be one of the given ids.
    pub fn set_versions(&self, key: &str, versions: &[(u64, KeyVersionState)], primary: u64) {
        self.keys.borrow_mut().insert(
            key.to_string(),
            KeyState {
                versions: versions.iter().cloned().collect(),
                primary,
            },
        );
    }

    /// Make `disable_version` on this version report it as still enabled.
    pub fn refuse_disable(&self, key: &str, version: &str) {
        self.stuck
            .borrow_mut()
            .insert((key.to_string(), version.to_string()));
    }

    fn with_key<T>(&self, key: &str, f: impl FnOnce(&mut KeyState) -> T) -> T {
        let mut keys = self.keys.borrow_mut();
        let state = keys.entry(key.to_string()).or_insert_with(KeyState::fresh);
        f(state)
    }

    fn parse_version(operation: &'static str, key: &str, version: &str) -> Result<u64> {
        version
            .parse()
            .map_err(|_| TransportError::malformed(operation, key, version).into())
    }

    fn failure(operation: &'static str, key: &str, response: String) -> crate::error::Error {
        TransportError::Command {
            operation,
            key: key.to_string(),
            response,
        }
        .into()
    }
}

impl KeyManagementClient for MemoryKms {
    fn primary_version(&self, key: &str) -> Result<VersionId> {
        Ok(self.with_key(key, |s| s.primary.to_string()))
    }

    fn version_name(&self, key: &str, version: &str) -> String {
        format!("memory/cryptoKeys/{}/cryptoKeyVersions/{}", key, version)
    }

    fn encrypt(&self, key: &str, version: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        let id = Self::parse_version("encrypt", key, version)?;
        let state = self.with_key(key, |s| s.versions.get(&id).cloned());
        if state != Some(KeyVersionState::Enabled) {
            return Err(Self::failure(
                "encrypt",
                key,
                format!("version {} is not enabled", version),
            ));
        }

        trace!(key, version, plaintext_len = plaintext.len(), "memory kms encrypt");
        Ok(format!("{}:{}:{}:{}", MAGIC, key, id, hex::encode(plaintext)).into_bytes())
    }

    fn decrypt(&self, key: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let raw = String::from_utf8_lossy(ciphertext);
        let malformed = || TransportError::malformed("decrypt", key, raw.to_string());

        let mut parts = raw.splitn(4, ':');
        let (Some(MAGIC), Some(owner), Some(version), Some(payload)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed().into());
        };

        if owner != key {
            return Err(Self::failure(
                "decrypt",
                key,
                format!("ciphertext belongs to key '{}'", owner),
            ));
        }

        let id: u64 = version.parse().map_err(|_| malformed())?;
        let state = self.with_key(key, |s| s.versions.get(&id).cloned());
        if state != Some(KeyVersionState::Enabled) {
            return Err(Self::failure(
                "decrypt",
                key,
                format!("version {} is not enabled", version),
            ));
        }

        hex::decode(payload).map_err(|_| malformed().into())
    }

    fn create_version(&self, key: &str) -> Result<VersionId> {
        let id = self.with_key(key, |s| {
            let next = s.versions.keys().next_back().copied().unwrap_or(0) + 1;
            s.versions.insert(next, KeyVersionState::Enabled);
            s.primary = next;
            next
        });
        trace!(key, version = id, "memory kms created version");
        Ok(id.to_string())
    }

    fn list_versions(&self, key: &str) -> Result<Vec<KeyVersion>> {
        Ok(self.with_key(key, |s| {
            s.versions
                .iter()
                .map(|(id, state)| KeyVersion {
                    id: id.to_string(),
                    state: state.clone(),
                    is_primary: *id == s.primary,
                })
                .collect()
        }))
    }

    fn disable_version(&self, key: &str, version: &str) -> Result<KeyVersionState> {
        let id = Self::parse_version("disable version", key, version)?;
        if self
            .stuck
            .borrow()
            .contains(&(key.to_string(), version.to_string()))
        {
            return Ok(KeyVersionState::Enabled);
        }

        self.with_key(key, |s| match s.versions.get_mut(&id) {
            Some(state) => {
                *state = KeyVersionState::Disabled;
                Ok(KeyVersionState::Disabled)
            }
            None => Err(Self::failure(
                "disable version",
                key,
                format!("version {} not found", version),
            )),
        })
    }
}
