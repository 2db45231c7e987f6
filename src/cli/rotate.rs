//! Rotate-key command.
//!
//! Creates a new primary version of one encryption key, disables every
//! other enabled version and re-encrypts the key's stored secrets under the
//! new primary.

use std::path::Path;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::kms::{self, KeyManagementClient};
use crate::core::lifecycle::SecretLifecycle;
use crate::core::manifest::EncryptionKeyConfig;
use crate::core::rotation::{Rotation, RotationController};
use crate::core::store::{self, SecretStore};
use crate::error::Result;

/// Rotate `key`, which must be listed in the key config.
pub fn execute(config: &Path, key: &str) -> Result<i32> {
    let config = Config::load(config)?;
    let key_config = EncryptionKeyConfig::load(config.key_config_path())?;
    key_config.ensure_known([key])?;

    let kms = kms::from_config(&config)?;
    let store = store::from_config(&config)?;

    output::progress(&format!("Rotating {}", output::key(key)));
    let (rotation, resealed) = match rotate_and_reseal(&kms, &store, key) {
        Ok(done) => {
            output::progress_done(true);
            done
        }
        Err(e) => {
            output::progress_done(false);
            return Err(e);
        }
    };

    output::kv("primary", &rotation.primary);
    if rotation.disabled.is_empty() {
        output::kv("disabled", "none");
    } else {
        output::kv("disabled", rotation.disabled.join(", "));
    }
    match resealed {
        Some(count) => output::kv("re-encrypted", format!("{} secrets", count)),
        None => output::kv("re-encrypted", "nothing stored"),
    }
    output::success(&format!("rotated {}", key));
    Ok(0)
}

/// Rotate `key` without stranding its stored secrets.
///
/// The blob is decrypted before any version is disabled and pushed again
/// under the new primary afterwards. Returns the rotation and the number of
/// secrets re-encrypted, or `None` when nothing was stored.
///
/// # Errors
///
/// A blob that cannot be fetched aborts before the key is touched.
pub fn rotate_and_reseal<K, S>(
    kms: &K,
    store: &S,
    key: &str,
) -> Result<(Rotation, Option<usize>)>
where
    K: KeyManagementClient + ?Sized,
    S: SecretStore + ?Sized,
{
    let lifecycle = SecretLifecycle::new(kms, store);
    let stored = lifecycle.fetch(key)?;

    let rotation = RotationController::new(kms).rotate(key)?;

    let resealed = match stored {
        Some(values) => {
            info!(key, version = %rotation.primary, "re-encrypting stored secrets");
            lifecycle.push(key, &values)?;
            Some(values.len())
        }
        None => None,
    };

    Ok((rotation, resealed))
}
