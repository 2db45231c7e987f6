//! Secret value provisioning.
//!
//! Fills in values nobody supplied. `secret_*` names get a random hex token,
//! `key_*` names get base64 AES-256 key material.

use rand::RngCore;
use tracing::debug;

use crate::core::domain::SecretKind;
use crate::core::types::{SecretName, SecretValueMap};

/// Result of provisioning one key group.
#[derive(Debug, Default)]
pub struct Provisioned {
    /// Every requested name with its value
    pub values: SecretValueMap,
    /// Names that received a freshly generated value
    pub generated: Vec<SecretName>,
}

/// Generates missing secret values. Never touches the network or storage.
pub struct SecretValueProvisioner<R: RngCore = rand::rngs::OsRng> {
    rng: R,
}

impl SecretValueProvisioner {
    /// Provisioner backed by the operating system's CSPRNG.
    pub fn new() -> Self {
        Self {
            rng: rand::rngs::OsRng,
        }
    }
}

impl Default for SecretValueProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> SecretValueProvisioner<R> {
    /// Provisioner drawing from a caller-supplied RNG.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Return a value for every name in `names`.
    ///
    /// Non-empty entries of `existing` are kept as they are; everything else
    /// is generated according to the name's prefix. Names without a known
    /// prefix are passed through only if they already have a value.
    pub fn populate<'a, I>(&mut self, names: I, existing: &SecretValueMap) -> Provisioned
    where
        I: IntoIterator<Item = &'a SecretName>,
    {
        let mut provisioned = Provisioned::default();

        for name in names {
            match existing.get(name).filter(|v| !v.is_empty()) {
                Some(value) => {
                    provisioned.values.insert(name.clone(), value.clone());
                }
                None => {
                    let Some(kind) = SecretKind::of(name) else {
                        continue;
                    };
                    let value = kind.generate_with(&mut self.rng);
                    provisioned.values.insert(name.clone(), value);
                    provisioned.generated.push(name.clone());
                }
            }
        }

        debug!(
            total = provisioned.values.len(),
            generated = provisioned.generated.len(),
            "populated secrets"
        );
        provisioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use rand::rngs::mock::StepRng;

    fn names(list: &[&str]) -> Vec<SecretName> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_existing_values_kept() {
        let mut existing = SecretValueMap::new();
        existing.insert("secret_a".into(), "supplied".into());

        let out = SecretValueProvisioner::new().populate(&names(&["secret_a"]), &existing);

        assert_eq!(out.values["secret_a"], "supplied");
        assert!(out.generated.is_empty());
    }

    #[test]
    fn test_empty_existing_value_is_regenerated() {
        let mut existing = SecretValueMap::new();
        existing.insert("secret_a".into(), String::new());

        let out = SecretValueProvisioner::new().populate(&names(&["secret_a"]), &existing);

        assert_eq!(out.values["secret_a"].len(), 32);
        assert_eq!(out.generated, vec!["secret_a"]);
    }

    #[test]
    fn test_generation_by_prefix() {
        let out = SecretValueProvisioner::new().populate(
            &names(&["key_example", "secret_example"]),
            &SecretValueMap::new(),
        );

        let key = base64::engine::general_purpose::STANDARD
            .decode(&out.values["key_example"])
            .unwrap();
        assert_eq!(key.len(), 32);

        let token = &out.values["secret_example"];
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(out.generated.len(), 2);
    }

    #[test]
    fn test_deterministic_with_seeded_rng() {
        let mut provisioner = SecretValueProvisioner::with_rng(StepRng::new(0, 0));
        let out = provisioner.populate(&names(&["secret_zero"]), &SecretValueMap::new());

        assert_eq!(out.values["secret_zero"], "0".repeat(32));
    }

    #[test]
    fn test_unprefixed_name_without_value_skipped() {
        let out =
            SecretValueProvisioner::new().populate(&names(&["password"]), &SecretValueMap::new());
        assert!(out.values.is_empty());
    }
}
