//! Exported environment.
//!
//! Turns a resolved context into the variables provisioning tools read:
//! `TF_VAR_<secret>` for every secret, plus the key ring name and the list
//! of configured encryption keys.

use std::collections::BTreeSet;
use zeroize::Zeroizing;

use crate::core::constants::{
    ENCRYPTION_KEYS_VAR, ENV_PREFIX, KEYRING_VAR, LEGACY_STATE_KEY_SECRET, LEGACY_STATE_KEY_VAR,
};
use crate::core::context::ResolutionContext;
use crate::core::manifest::EncryptionKeyConfig;
use crate::core::types::KeyGroups;

/// Ordered environment variables for a deployment step.
///
/// Values are wiped from memory on drop.
#[derive(Debug, Default)]
pub struct Exported {
    vars: Vec<(String, Zeroizing<String>)>,
}

/// Options controlling which variables are exported.
#[derive(Debug, Clone)]
pub struct ExportOptions<'a> {
    pub keyring: &'a str,
    /// Mirror `key_tfstate_encryption_key` into `GOOGLE_ENCRYPTION_KEY`
    /// for Terraform's GCS state backend.
    pub legacy_state_key: bool,
}

impl Exported {
    /// Build the environment from a resolved context.
    ///
    /// Only names declared in `groups` are exported. Anything else the
    /// context was seeded with, such as variables left over from an earlier
    /// export, never reaches the output.
    pub fn build(
        ctx: &ResolutionContext,
        groups: &KeyGroups,
        keys: &EncryptionKeyConfig,
        options: &ExportOptions<'_>,
    ) -> Self {
        let mut vars = vec![
            (KEYRING_VAR.to_string(), Zeroizing::new(options.keyring.to_string())),
            (
                ENCRYPTION_KEYS_VAR.to_string(),
                Zeroizing::new(encryption_keys_value(keys.keys())),
            ),
        ];

        let declared: BTreeSet<&str> = groups.values().flatten().map(String::as_str).collect();
        for name in &declared {
            if let Some(value) = ctx.get(name) {
                vars.push((format!("{}{}", ENV_PREFIX, name), Zeroizing::new(value.to_string())));
            }
        }

        if options.legacy_state_key && declared.contains(LEGACY_STATE_KEY_SECRET) {
            if let Some(value) = ctx.get(LEGACY_STATE_KEY_SECRET) {
                vars.push((
                    LEGACY_STATE_KEY_VAR.to_string(),
                    Zeroizing::new(value.to_string()),
                ));
            }
        }

        Self { vars }
    }

    /// Variables in export order
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of one variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render as POSIX shell `export` lines, suitable for `eval`.
    pub fn to_shell(&self) -> Zeroizing<String> {
        let mut out = String::new();
        for (name, value) in self.vars() {
            out.push_str("export ");
            out.push_str(name);
            out.push('=');
            out.push_str(&shell_quote(value));
            out.push('\n');
        }
        Zeroizing::new(out)
    }

    /// Render as a JSON object.
    pub fn to_json(&self) -> Zeroizing<String> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .vars()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        Zeroizing::new(serde_json::Value::Object(map).to_string())
    }
}

/// `[ "a", "b" ]`, the HCL list literal Terraform expects.
fn encryption_keys_value(keys: &[String]) -> String {
    let quoted: Vec<String> = keys.iter().map(|k| format!("\"{}\"", k)).collect();
    format!("[ {} ]", quoted.join(", "))
}

/// Single-quote a value for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
