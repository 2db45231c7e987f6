//! Test fixtures and constants.

/// Project id written into the test config.
pub const PROJECT_ID: &str = "demo";

/// Config using the filesystem store so no cloud access is needed.
pub const CONFIG_TOML: &str = r#"[project]
id = "demo"

[store]
backend = "fs"
path = ".strongbox/blobs"
"#;

/// The two-module scenario: both modules share the `default` key.
pub const SHARED_KEY_MODULES: &[(&str, &[&str], Option<&str>)] = &[
    ("a", &["secret_x", "key_y"], Some("default")),
    ("b", &["secret_z"], Some("default")),
];
