//! Encrypted blob storage.
//!
//! One object per encryption key holds the sealed [`EncryptedBlob`] for that
//! key's secrets. A missing object is a normal outcome: it means the key's
//! secrets have never been provisioned.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file
//! 3. Re-export from this module and wire it into [`from_config`]
//!
//! [`EncryptedBlob`]: crate::core::domain::EncryptedBlob

use crate::core::config::{Config, StoreBackend};
use crate::core::constants::SECRETS_FILE;
use crate::error::Result;

mod fs;
#[cfg(feature = "gcp")]
pub mod gcs;
mod memory;

pub use fs::Filesystem;
#[cfg(feature = "gcp")]
pub use gcs::GcsStore;
pub use memory::MemoryStore;

/// Blob storage keyed by encryption key name.
pub trait SecretStore {
    /// Whether a blob exists for `key`.
    ///
    /// Only a definite "not found" yields `false`; every other failure is a
    /// `TransportError`.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Download the blob for `key`. Only valid after `exists` returned `true`.
    fn download(&self, key: &str) -> Result<Vec<u8>>;

    /// Create or overwrite the blob for `key`.
    fn upload(&self, key: &str, data: &[u8]) -> Result<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn download(&self, key: &str) -> Result<Vec<u8>> {
        (**self).download(key)
    }

    fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).upload(key, data)
    }
}

/// Where the blob for one encryption key lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub bucket: String,
    pub object: String,
}

impl ObjectName {
    /// `<project>-<key>-secrets` / `secrets.yaml`
    pub fn for_key(project: &str, key: &str) -> Self {
        Self {
            bucket: format!("{}-{}-secrets", project, key),
            object: SECRETS_FILE.to_string(),
        }
    }
}

/// Build the store named in the configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn SecretStore>> {
    let project = config.project_id()?;
    match config.store_backend()? {
        StoreBackend::Filesystem(root) => Ok(Box::new(Filesystem::new(root, project))),
        #[cfg(feature = "gcp")]
        StoreBackend::Gcs => Ok(Box::new(GcsStore::new(project))),
        #[cfg(not(feature = "gcp"))]
        StoreBackend::Gcs => Err(crate::error::Error::Other(
            "GCS support not compiled. Rebuild with: cargo install strongbox --features gcp"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_for_key() {
        let name = ObjectName::for_key("gpii-dev", "default");
        assert_eq!(name.bucket, "gpii-dev-default-secrets");
        assert_eq!(name.object, "secrets.yaml");
    }
}
