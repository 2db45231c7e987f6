//! Tests for `strongbox completions`.

use crate::support::*;

#[test]
fn test_bash_completions_name_binary() {
    let t = Test::new(&["default"]);

    let output = t.cmd().args(["completions", "bash"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "strongbox");
    assert_stdout_contains(&output, "rotate-key");
}

#[test]
fn test_unknown_shell_rejected() {
    let t = Test::new(&["default"]);

    t.cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("invalid value"));
}
