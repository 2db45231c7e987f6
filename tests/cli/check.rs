//! Tests for `strongbox check`.

use crate::support::*;

#[test]
fn test_check_lists_secrets_by_key() {
    let t = Test::with_modules(SHARED_KEY_MODULES);

    let output = t.check();
    assert_success(&output);
    assert_eq!(stdout(&output), "default\n  key_y\n  secret_x\n  secret_z\n");
    assert_stderr_contains(&output, "2 modules valid, 3 secrets across 1 keys");
}

#[test]
fn test_check_json_groups() {
    let t = Test::with_modules(&[
        ("couch", &["secret_couch_password"], Some("couchdb")),
        ("web", &["secret_session"], Some("default")),
    ]);

    let output = t.check_json();
    assert_success(&output);

    let groups: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(groups["couchdb"], serde_json::json!(["secret_couch_password"]));
    assert_eq!(groups["default"], serde_json::json!(["secret_session"]));
}

#[test]
fn test_check_module_name_is_default_key() {
    let t = Test::new(&["web"]);
    t.module("web", &["secret_session"], None);

    let output = t.check_json();
    assert_success(&output);
    assert_stdout_contains(&output, "\"web\"");
}

#[test]
fn test_check_module_without_secrets() {
    let t = Test::new(&["default"]);
    t.write("modules/idle/secrets.yaml", "encryption_key: default\n");

    let output = t.check_json();
    assert_success(&output);
    let groups: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(groups["default"], serde_json::json!([]));
}

#[test]
fn test_check_nested_modules_discovered() {
    let t = Test::new(&["default"]);
    t.module("platform/db", &["secret_db"], Some("default"));

    let output = t.check();
    assert_success(&output);
    assert_stdout_contains(&output, "secret_db");
}

#[test]
fn test_check_needs_no_project_id() {
    let t = Test::with_modules(SHARED_KEY_MODULES);
    t.write("strongbox.toml", "[store]\nbackend = \"fs\"\n");

    let output = t.check();
    assert_success(&output);
}
