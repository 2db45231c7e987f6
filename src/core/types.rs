//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::{BTreeMap, BTreeSet};

/// A secret name (e.g. `secret_couchdb_admin_password`, `key_tfstate_encryption_key`).
///
/// Must start with `secret_` or `key_`.
pub type SecretName = String;

/// Name of an encryption key in the KMS key ring.
pub type KeyName = String;

/// Name of a module, taken from the directory holding its manifest.
pub type ModuleName = String;

/// Numeric key version identifier, as the trailing segment of a resource path.
pub type VersionId = String;

/// Resolved plaintext values for one key group.
pub type SecretValueMap = BTreeMap<SecretName, String>;

/// Secret names grouped by the encryption key that protects them.
pub type KeyGroups = BTreeMap<KeyName, BTreeSet<SecretName>>;
