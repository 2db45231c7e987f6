//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a strongbox command running inside the test project.
    ///
    /// Inherited `TF_VAR_` values and log settings are cleared so the
    /// developer's shell cannot leak into assertions.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("strongbox").expect("failed to find strongbox binary");
        for (name, _) in std::env::vars() {
            if name.starts_with("TF_VAR_") {
                cmd.env_remove(name);
            }
        }
        cmd.env_remove("STRONGBOX_LOG");
        cmd.env_remove("STRONGBOX_CONFIG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `strongbox check`.
    pub fn check(&self) -> Output {
        self.cmd()
            .arg("check")
            .output()
            .expect("failed to run strongbox check")
    }

    /// Shortcut for `strongbox check --json`.
    pub fn check_json(&self) -> Output {
        self.cmd()
            .args(["check", "--json"])
            .output()
            .expect("failed to run strongbox check --json")
    }

    /// Shortcut for `strongbox export --json`.
    pub fn export_json(&self) -> Output {
        self.cmd()
            .args(["export", "--json"])
            .output()
            .expect("failed to run strongbox export")
    }

    /// Shortcut for `strongbox export --json` with extra environment.
    pub fn export_json_with(&self, vars: &[(&str, &str)]) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["export", "--json"]);
        for (k, v) in vars {
            cmd.env(k, v);
        }
        cmd.output().expect("failed to run strongbox export")
    }

    /// Shortcut for `strongbox rotate-key`.
    pub fn rotate_key(&self, key: &str) -> Output {
        self.cmd()
            .args(["rotate-key", key])
            .output()
            .expect("failed to run strongbox rotate-key")
    }
}
