//! Tests for error reporting and exit codes.

use crate::support::*;

#[test]
fn test_invalid_prefix_rejected() {
    let t = Test::with_modules(&[("a", &["password"], None)]);

    let output = t.check();
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(
        &output,
        "can not use secret 'password' for module 'a': secret name must start with 'secret_' or 'key_'",
    );
}

#[test]
fn test_duplicate_secret_rejected() {
    let t = Test::with_modules(&[("a", &["secret_x"], None), ("b", &["secret_x"], None)]);

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(
        &output,
        "can not use secret 'secret_x' for module 'b': already in use by module 'a'",
    );
}

#[test]
fn test_unknown_encryption_keys_listed_together() {
    let t = Test::new(&["default"]);
    t.module("a", &["secret_a"], Some("couchdb"));
    t.module("b", &["secret_b"], Some("mongo"));

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(&output, "encryption keys \"couchdb, mongo\" not present in");
}

#[test]
fn test_malformed_manifest_reported() {
    let t = Test::new(&["default"]);
    t.write("modules/a/secrets.yaml", "secrets: [unterminated\n");

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse");
}

#[test]
fn test_missing_key_config_reported() {
    let t = Test::new(&["default"]);
    std::fs::remove_file(t.path("modules/gcp-secret-mgmt/config.yaml")).unwrap();

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to read");
}

#[test]
fn test_unknown_store_backend_rejected() {
    let t = Test::with_modules(SHARED_KEY_MODULES);
    t.write("strongbox.toml", "[store]\nbackend = \"s3\"\n");

    let output = t.check();
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown backend 's3'");
}

#[test]
fn test_rotate_key_requires_configured_key() {
    let t = Test::new(&["default"]);

    let output = t.rotate_key("couchdb");
    assert_failure(&output);
    assert_stderr_contains(&output, "encryption keys \"couchdb\" not present in");
}

#[test]
fn test_run_requires_command() {
    let t = Test::with_modules(SHARED_KEY_MODULES);

    let output = t.cmd().arg("run").output().unwrap();
    assert_failure(&output);
}
