//! Manifest collection.
//!
//! Reads each module's `secrets.yaml`, groups secret names by encryption
//! key and validates them against the encryption key allow-list.
//!
//! A manifest looks like:
//!
//! ```yaml
//! secrets:
//!   - secret_couchdb_admin_password
//!   - key_couchdb_backup_key
//! encryption_key: default
//! ```
//!
//! Secret names are global across modules, so prefixing them with the module
//! name (`secret_couchdb_admin_password` rather than `secret_admin_password`)
//! avoids collisions.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::core::constants::SECRETS_FILE;
use crate::core::context::ResolutionContext;
use crate::core::domain::{Module, ModuleManifest, SecretKind};
use crate::core::types::{KeyGroups, KeyName};
use crate::error::{ManifestError, Result};

/// The authoritative, ordered list of encryption keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EncryptionKeyConfig {
    encryption_keys: Vec<KeyName>,
    #[serde(skip)]
    source: PathBuf,
}

impl EncryptionKeyConfig {
    /// Build from a list of key names
    pub fn new(keys: Vec<KeyName>, source: impl Into<PathBuf>) -> Self {
        Self {
            encryption_keys: keys,
            source: source.into(),
        }
    }

    /// Load the `encryption_keys` list from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Read` or `ManifestError::Parse`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading encryption key config");

        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_yaml::from_str(&contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.source = path.to_path_buf();
        Ok(config)
    }

    /// Key names in configured order
    pub fn keys(&self) -> &[KeyName] {
        &self.encryption_keys
    }

    /// Whether `key` is allowed
    pub fn contains(&self, key: &str) -> bool {
        self.encryption_keys.iter().any(|k| k == key)
    }

    /// Fail with `UnknownEncryptionKeys` unless every key is configured.
    pub fn ensure_known<'a, I>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unknown: Vec<String> = keys
            .into_iter()
            .filter(|key| !self.contains(key))
            .map(str::to_string)
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ManifestError::UnknownEncryptionKeys {
                keys: unknown,
                config: self.source.clone(),
            }
            .into())
        }
    }

    /// Path the list was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Find every module manifest under `root`.
///
/// The module name is the directory holding the manifest. Results are sorted
/// by path so collection order is stable.
///
/// # Errors
///
/// Returns `ManifestError::Read` or `ManifestError::Parse` for unreadable
/// directories or manifests.
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<Module>> {
    let root = root.as_ref();
    let mut paths = Vec::new();
    find_manifests(root, &mut paths)?;
    paths.sort();

    let mut modules = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let contents = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;
        // An empty file parses as null; treat it as a module without secrets.
        let manifest: Option<ModuleManifest> =
            serde_yaml::from_str(&contents).map_err(|source| ManifestError::Parse {
                path: path.clone(),
                source,
            })?;

        trace!(module = %name, path = %path.display(), "found manifest");
        modules.push(Module::from_manifest(name, manifest.unwrap_or_default()));
    }

    debug!(modules = modules.len(), root = %root.display(), "discovered manifests");
    Ok(modules)
}

fn find_manifests(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| ManifestError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            find_manifests(&path, found)?;
        } else if path.file_name().is_some_and(|n| n == SECRETS_FILE) {
            found.push(path);
        }
    }
    Ok(())
}

/// Groups module secrets by encryption key.
#[derive(Debug)]
pub struct ManifestCollector<'a> {
    key_config: &'a EncryptionKeyConfig,
}

impl<'a> ManifestCollector<'a> {
    pub fn new(key_config: &'a EncryptionKeyConfig) -> Self {
        Self { key_config }
    }

    /// Collect and validate secret declarations.
    ///
    /// On success every collected name is registered in `ctx` (as an unset
    /// placeholder unless a value is already known). On failure `ctx` is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// - `ManifestError::InvalidPrefix` for a name without `secret_`/`key_`
    /// - `ManifestError::DuplicateSecret` for a name used by two modules
    /// - `ManifestError::UnknownEncryptionKeys` listing every key missing
    ///   from the allow-list
    pub fn collect(&self, modules: &[Module], ctx: &mut ResolutionContext) -> Result<KeyGroups> {
        let mut groups = KeyGroups::new();
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();

        for module in modules {
            let group = groups.entry(module.encryption_key().to_string()).or_default();

            for secret in module.secrets() {
                if SecretKind::of(secret).is_none() {
                    return Err(ManifestError::InvalidPrefix {
                        secret: secret.clone(),
                        module: module.name().to_string(),
                    }
                    .into());
                }

                let owner = *owners.entry(secret.as_str()).or_insert(module.name());
                if owner != module.name() {
                    return Err(ManifestError::DuplicateSecret {
                        secret: secret.clone(),
                        module: module.name().to_string(),
                        owner: owner.to_string(),
                    }
                    .into());
                }

                group.insert(secret.clone());
            }
        }

        self.key_config
            .ensure_known(groups.keys().map(String::as_str))?;

        for name in groups.values().flatten() {
            ctx.register(name);
        }

        debug!(
            keys = groups.len(),
            secrets = owners.len(),
            "collected secrets"
        );
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    fn module(name: &str, key: Option<&str>, secrets: &[&str]) -> Module {
        Module::new(
            name,
            key.map(str::to_string),
            secrets.iter().map(|s| s.to_string()).collect(),
        )
    }

    fn keys(names: &[&str]) -> EncryptionKeyConfig {
        EncryptionKeyConfig::new(names.iter().map(|s| s.to_string()).collect(), "config.yaml")
    }

    #[test]
    fn test_shared_key_merges_modules() {
        let config = keys(&["shared"]);
        let modules = vec![
            module("a", Some("shared"), &["secret_a_pw"]),
            module("b", Some("shared"), &["secret_b_pw"]),
        ];
        let mut ctx = ResolutionContext::new();

        let groups = ManifestCollector::new(&config)
            .collect(&modules, &mut ctx)
            .unwrap();

        assert_eq!(groups.len(), 1);
        let shared: Vec<_> = groups["shared"].iter().cloned().collect();
        assert_eq!(shared, vec!["secret_a_pw", "secret_b_pw"]);
        assert!(ctx.contains("secret_a_pw"));
        assert!(ctx.contains("secret_b_pw"));
    }

    #[test]
    fn test_module_name_is_default_key() {
        let config = keys(&["couchdb"]);
        let modules = vec![module("couchdb", None, &["secret_couchdb_pw"])];

        let groups = ManifestCollector::new(&config)
            .collect(&modules, &mut ResolutionContext::new())
            .unwrap();

        assert!(groups["couchdb"].contains("secret_couchdb_pw"));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let config = keys(&["a"]);
        let modules = vec![module("a", None, &["password"])];
        let mut ctx = ResolutionContext::new();

        let err = ManifestCollector::new(&config)
            .collect(&modules, &mut ctx)
            .unwrap_err();

        match err {
            Error::Manifest(ManifestError::InvalidPrefix { secret, module }) => {
                assert_eq!(secret, "password");
                assert_eq!(module, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_duplicate_across_modules_rejected() {
        let config = keys(&["a", "b"]);
        let modules = vec![
            module("a", None, &["secret_shared"]),
            module("b", None, &["secret_shared"]),
        ];

        let err = ManifestCollector::new(&config)
            .collect(&modules, &mut ResolutionContext::new())
            .unwrap_err();

        match err {
            Error::Manifest(ManifestError::DuplicateSecret {
                secret,
                module,
                owner,
            }) => {
                assert_eq!(secret, "secret_shared");
                assert_eq!(module, "b");
                assert_eq!(owner, "a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeat_within_module_is_not_duplicate() {
        let config = keys(&["a"]);
        let modules = vec![module("a", None, &["secret_x", "secret_x"])];

        let groups = ManifestCollector::new(&config)
            .collect(&modules, &mut ResolutionContext::new())
            .unwrap();

        assert_eq!(groups["a"].len(), 1);
    }

    #[test]
    fn test_unknown_keys_reported_together() {
        let config = keys(&["known"]);
        let modules = vec![
            module("a", Some("known"), &["secret_a"]),
            module("b", Some("stray"), &["secret_b"]),
            module("c", None, &["secret_c"]),
        ];

        let err = ManifestCollector::new(&config)
            .collect(&modules, &mut ResolutionContext::new())
            .unwrap_err();

        match err {
            Error::Manifest(ManifestError::UnknownEncryptionKeys { keys, .. }) => {
                assert_eq!(keys, vec!["c", "stray"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_module_still_checked_against_config() {
        let config = keys(&[]);
        let modules = vec![module("empty", None, &[])];

        assert!(ManifestCollector::new(&config)
            .collect(&modules, &mut ResolutionContext::new())
            .is_err());
    }

    #[test]
    fn test_supplied_values_survive_collection() {
        let config = keys(&["a"]);
        let modules = vec![module("a", None, &["secret_a"])];
        let mut ctx = ResolutionContext::new();
        ctx.set("secret_a", "from-caller");

        ManifestCollector::new(&config)
            .collect(&modules, &mut ctx)
            .unwrap();

        assert_eq!(ctx.get("secret_a"), Some("from-caller"));
    }

    #[test]
    fn test_discover_reads_nested_manifests() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("gcp/couchdb");
        let b = tmp.path().join("flowmanager");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(
            a.join("secrets.yaml"),
            "secrets:\n  - secret_couchdb_pw\nencryption_key: default\n",
        )
        .unwrap();
        std::fs::write(b.join("secrets.yaml"), "").unwrap();
        std::fs::write(b.join("main.tf"), "# not a manifest").unwrap();

        let modules = discover(tmp.path()).unwrap();

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name(), "flowmanager");
        assert!(modules[0].secrets().is_empty());
        assert_eq!(modules[1].name(), "couchdb");
        assert_eq!(modules[1].encryption_key(), "default");
    }

    #[test]
    fn test_discover_reports_bad_yaml() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("broken");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("secrets.yaml"), "secrets: [unterminated").unwrap();

        let err = discover(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Manifest(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_key_config_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "encryption_keys:\n  - default\n  - couchdb\n").unwrap();

        let config = EncryptionKeyConfig::load(&path).unwrap();
        assert_eq!(config.keys(), ["default", "couchdb"]);
        assert_eq!(config.source(), path.as_path());
    }
}
