//! Key management service access.
//!
//! Abstracts the KMS operations strongbox needs so the lifecycle and rotation
//! logic never deal with transports.
//!
//! ## Backends
//!
//! - **gcloud**: Feature-gated (`gcp`). Google Cloud KMS via the gcloud CLI.
//! - **memory**: In-process key ring for tests and the `test-kms` build.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `KeyManagementClient` trait
//! 2. Add the implementation in a new file
//! 3. Feature-gate if appropriate
//! 4. Re-export from this module and wire it into [`from_config`]

use crate::core::config::Config;
use crate::core::domain::{KeyVersion, KeyVersionState};
use crate::core::types::VersionId;
use crate::error::Result;

#[cfg(feature = "gcp")]
pub mod gcp;
mod memory;

#[cfg(feature = "gcp")]
pub use gcp::GcloudKms;
pub use memory::MemoryKms;

/// Operations on the encryption keys of one key ring.
///
/// Every error is a `TransportError` and is fatal; callers never retry.
pub trait KeyManagementClient {
    /// Id of the key's current primary version.
    fn primary_version(&self, key: &str) -> Result<VersionId>;

    /// Full resource name of a key version, stored next to ciphertext.
    fn version_name(&self, key: &str, version: &str) -> String;

    /// Encrypt `plaintext` with the given (primary) version of `key`.
    fn encrypt(&self, key: &str, version: &str, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt ciphertext produced by any enabled version of `key`.
    fn decrypt(&self, key: &str, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Create a new version and make it primary. Returns its id.
    fn create_version(&self, key: &str) -> Result<VersionId>;

    /// Every version of `key`, with `is_primary` set on the primary one.
    fn list_versions(&self, key: &str) -> Result<Vec<KeyVersion>>;

    /// Disable a version, returning the state the service reports afterwards.
    fn disable_version(&self, key: &str, version: &str) -> Result<KeyVersionState>;
}

impl<T: KeyManagementClient + ?Sized> KeyManagementClient for Box<T> {
    fn primary_version(&self, key: &str) -> Result<VersionId> {
        (**self).primary_version(key)
    }

    fn version_name(&self, key: &str, version: &str) -> String {
        (**self).version_name(key, version)
    }

    fn encrypt(&self, key: &str, version: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        (**self).encrypt(key, version, plaintext)
    }

    fn decrypt(&self, key: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(key, ciphertext)
    }

    fn create_version(&self, key: &str) -> Result<VersionId> {
        (**self).create_version(key)
    }

    fn list_versions(&self, key: &str) -> Result<Vec<KeyVersion>> {
        (**self).list_versions(key)
    }

    fn disable_version(&self, key: &str, version: &str) -> Result<KeyVersionState> {
        (**self).disable_version(key, version)
    }
}

/// Build the KMS client for a configuration.
///
/// Test builds (`test-kms`) always get the in-memory key ring.
#[allow(unused_variables)]
pub fn from_config(config: &Config) -> Result<Box<dyn KeyManagementClient>> {
    #[cfg(feature = "test-kms")]
    {
        return Ok(Box::new(MemoryKms::new()));
    }

    #[cfg(all(not(feature = "test-kms"), feature = "gcp"))]
    {
        let project = config.project_id()?;
        Ok(Box::new(GcloudKms::new(
            project,
            config.kms.location.clone(),
            config.kms.keyring.clone(),
        )))
    }

    #[cfg(all(not(feature = "test-kms"), not(feature = "gcp")))]
    {
        Err(crate::error::Error::Other(
            "no KMS backend compiled. Rebuild with: cargo install strongbox --features gcp"
                .to_string(),
        ))
    }
}
