//! Test support utilities for strongbox integration tests.
//!
//! Provides an isolated module tree on disk plus helpers to drive the CLI.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment rooted in a temporary directory.
///
/// Layout:
///
/// ```text
/// <dir>/strongbox.toml                         # fs store, project "demo"
/// <dir>/modules/gcp-secret-mgmt/config.yaml    # encryption_keys
/// <dir>/modules/<name>/secrets.yaml            # one per module
/// ```
///
/// Child processes use `.current_dir()`, so tests run in parallel safely.
pub struct Test {
    pub dir: TempDir,
}

impl Test {
    /// Empty project with the given encryption keys configured.
    pub fn new(keys: &[&str]) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let t = Self { dir };
        t.write("strongbox.toml", CONFIG_TOML);
        t.set_keys(keys);
        t
    }

    /// Project with the `default` key and the given modules.
    pub fn with_modules(modules: &[(&str, &[&str], Option<&str>)]) -> Self {
        let mut keys: Vec<&str> = vec!["default"];
        for (_, _, key) in modules {
            if let Some(key) = key {
                if !keys.contains(key) {
                    keys.push(*key);
                }
            }
        }

        let t = Self::new(&keys);
        for (name, secrets, key) in modules {
            t.module(name, secrets, *key);
        }
        t
    }

    /// Absolute path inside the project.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(path, contents).expect("failed to write file");
    }

    /// Replace the encryption key allow-list.
    pub fn set_keys(&self, keys: &[&str]) {
        let mut yaml = String::from("encryption_keys:\n");
        for key in keys {
            yaml.push_str(&format!("  - {}\n", key));
        }
        self.write("modules/gcp-secret-mgmt/config.yaml", &yaml);
    }

    /// Write `modules/<name>/secrets.yaml`.
    pub fn module(&self, name: &str, secrets: &[&str], key: Option<&str>) {
        let mut yaml = String::from("secrets:\n");
        for secret in secrets {
            yaml.push_str(&format!("  - {}\n", secret));
        }
        if let Some(key) = key {
            yaml.push_str(&format!("encryption_key: {}\n", key));
        }
        self.write(&format!("modules/{}/secrets.yaml", name), &yaml);
    }

    /// Path of the stored blob for `key` in the filesystem store.
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.path(&format!(
            ".strongbox/blobs/{}-{}-secrets/secrets.yaml",
            PROJECT_ID, key
        ))
    }
}
