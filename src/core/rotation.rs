//! Key version rotation.
//!
//! Creates a new primary version first and only then disables the others,
//! so the key always has at least one enabled version.

use tracing::{debug, info};

use crate::core::domain::KeyVersionState;
use crate::core::kms::KeyManagementClient;
use crate::core::types::VersionId;
use crate::error::{Result, RotationError};

/// Result of rotating one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    /// The newly created primary version
    pub primary: VersionId,
    /// Versions that were enabled and are now disabled
    pub disabled: Vec<VersionId>,
}

/// Rotates encryption key versions.
pub struct RotationController<'a, K: ?Sized> {
    kms: &'a K,
}

impl<'a, K: KeyManagementClient + ?Sized> RotationController<'a, K> {
    pub fn new(kms: &'a K) -> Self {
        Self { kms }
    }

    /// Create a new primary version of `key` and disable every other
    /// enabled version.
    ///
    /// # Errors
    ///
    /// `RotationError::NotDisabled` if the KMS reports a disabled version as
    /// anything but `DISABLED`. The new primary stays in place.
    pub fn rotate(&self, key: &str) -> Result<Rotation> {
        info!(key, "creating new primary version");
        let primary = self.kms.create_version(key)?;

        debug!(key, "retrieving versions");
        let versions = self.kms.list_versions(key)?;

        let mut disabled = Vec::new();
        for version in versions {
            if !version.is_enabled() || version.id == primary {
                continue;
            }

            info!(key, version = %version.id, "disabling version");
            let state = self.kms.disable_version(key, &version.id)?;
            if state != KeyVersionState::Disabled {
                return Err(RotationError::NotDisabled {
                    key: key.to_string(),
                    version: version.id,
                    state: state.to_string(),
                }
                .into());
            }
            disabled.push(version.id);
        }

        Ok(Rotation { primary, disabled })
    }
}
