//! Constants used throughout strongbox.
//!
//! Centralizes magic strings and configuration values.

/// Configuration file name (strongbox.toml).
pub const CONFIG_FILE: &str = "strongbox.toml";

/// Per-module manifest file name, also the object name inside each bucket.
pub const SECRETS_FILE: &str = "secrets.yaml";

/// Default directory scanned for module manifests.
pub const MODULES_DIR: &str = "modules";

/// Default location of the encryption key allow-list.
pub const KEY_CONFIG_FILE: &str = "modules/gcp-secret-mgmt/config.yaml";

/// Default KMS key ring.
pub const KMS_KEYRING: &str = "keyring";

/// Default KMS location.
pub const KMS_LOCATION: &str = "global";

/// Default root for the filesystem store.
pub const FS_STORE_DIR: &str = ".strongbox/blobs";

/// Prefix for opaque random tokens.
pub const TOKEN_PREFIX: &str = "secret_";

/// Prefix for symmetric cipher key material.
pub const CIPHER_KEY_PREFIX: &str = "key_";

/// Prefix under which resolved secrets are exported.
pub const ENV_PREFIX: &str = "TF_VAR_";

/// Environment variable holding the project id when the config has none.
pub const PROJECT_ID_VAR: &str = "TF_VAR_project_id";

/// Exported key ring name variable.
pub const KEYRING_VAR: &str = "TF_VAR_keyring_name";

/// Exported list of configured encryption keys.
pub const ENCRYPTION_KEYS_VAR: &str = "TF_VAR_encryption_keys";

/// Terraform GCS backend reads its state encryption key from here.
pub const LEGACY_STATE_KEY_VAR: &str = "GOOGLE_ENCRYPTION_KEY";

/// Secret whose value is mirrored into [`LEGACY_STATE_KEY_VAR`].
pub const LEGACY_STATE_KEY_SECRET: &str = "key_tfstate_encryption_key";

/// AES-256 key length in bytes.
pub const CIPHER_KEY_LEN: usize = 32;

/// Random token length in bytes (32 hex characters).
pub const TOKEN_LEN: usize = 16;
