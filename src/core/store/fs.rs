//! Filesystem blob store.
//!
//! Mirrors the bucket layout on local disk:
//! `<root>/<project>-<key>-secrets/secrets.yaml`. Useful for offline work
//! and CI where a bucket is not available.

use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{ObjectName, SecretStore};
use crate::error::{Result, TransportError};

/// Check a blob file has the expected permissions (Unix only).
#[cfg(unix)]
fn has_permissions(path: &std::path::Path, expected_mode: u32) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)?;
    Ok(metadata.permissions().mode() & 0o777 == expected_mode)
}

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
    project: String,
}

impl Filesystem {
    /// Store blobs for `project` under `root`
    pub fn new(root: impl Into<PathBuf>, project: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            project: project.into(),
        }
    }

    /// Path of the blob for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name = ObjectName::for_key(&self.project, key);
        self.root.join(name.bucket).join(name.object)
    }

    fn io_error(operation: &'static str, key: &str, e: std::io::Error) -> crate::error::Error {
        TransportError::Command {
            operation,
            key: key.to_string(),
            response: e.to_string(),
        }
        .into()
    }
}

impl SecretStore for Filesystem {
    fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(true),
            Ok(_) => Err(Self::io_error(
                "check secrets",
                key,
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("{} is not a file", path.display()),
                ),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error("check secrets", key, e)),
        }
    }

    fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        debug!(path = %path.display(), "reading blob");

        #[cfg(unix)]
        if let Ok(false) = has_permissions(&path, 0o600) {
            warn!(path = %path.display(), "blob file is readable by others; run chmod 600");
        }

        fs::read(&path).map_err(|e| Self::io_error("download secrets", key, e))
    }

    fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        debug!(path = %path.display(), bytes = data.len(), "writing blob");

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| Self::io_error("upload secrets", key, e))?;
        }
        fs::write(&path, data).map_err(|e| Self::io_error("upload secrets", key, e))?;

        // Restrict permissions on blob file (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(|e| Self::io_error("upload secrets", key, e))?;
        }

        Ok(())
    }
}
