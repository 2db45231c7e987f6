//! In-memory blob store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use super::SecretStore;
use crate::core::types::KeyName;
use crate::error::{Result, TransportError};

/// Blobs held in process memory. Counts uploads so tests can check that a
/// run did or did not push.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RefCell<BTreeMap<KeyName, Vec<u8>>>,
    uploads: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored bytes for `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.borrow().get(key).cloned()
    }

    /// Overwrite the stored bytes for `key` without counting an upload.
    pub fn put(&self, key: &str, data: &[u8]) {
        self.blobs.borrow_mut().insert(key.to_string(), data.to_vec());
    }

    /// Number of `upload` calls so far.
    pub fn uploads(&self) -> usize {
        self.uploads.get()
    }
}

impl SecretStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.borrow().contains_key(key))
    }

    fn download(&self, key: &str) -> Result<Vec<u8>> {
        self.get(key).ok_or_else(|| {
            TransportError::Status {
                operation: "download secrets",
                key: key.to_string(),
                status: 404,
                response: String::new(),
            }
            .into()
        })
    }

    fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        self.put(key, data);
        self.uploads.set(self.uploads.get() + 1);
        Ok(())
    }
}
