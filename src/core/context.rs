//! Resolution context.
//!
//! The value sink shared by every stage of a run: collection registers
//! placeholders, provisioning fills gaps, fetching overwrites with what the
//! store holds. It replaces reading and writing process environment variables.

use std::collections::BTreeMap;
use tracing::trace;

use crate::core::constants::ENV_PREFIX;
use crate::core::types::{SecretName, SecretValueMap};

/// Secret name → value for one run. `None` marks a name that was seen but
/// never given a value.
#[derive(Debug, Default, Clone)]
pub struct ResolutionContext {
    values: BTreeMap<SecretName, Option<String>>,
}

impl ResolutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `TF_VAR_*` style variables.
    ///
    /// Empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut ctx = Self::new();
        for (name, value) in vars {
            if let Some(secret) = name.as_ref().strip_prefix(ENV_PREFIX) {
                let value: String = value.into();
                let value = (!value.is_empty()).then_some(value);
                ctx.values.insert(secret.to_string(), value);
            }
        }
        trace!(seeded = ctx.values.len(), "context seeded from environment");
        ctx
    }

    /// Seed from the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Register a placeholder for `name` unless something is already known.
    pub fn register(&mut self, name: &str) {
        self.values.entry(name.to_string()).or_insert(None);
    }

    /// Record a value, replacing whatever was there.
    pub fn set(&mut self, name: impl Into<SecretName>, value: impl Into<String>) {
        self.values.insert(name.into(), Some(value.into()));
    }

    /// Current non-empty value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// Whether `name` was registered or supplied.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Known values for the given names, skipping unset ones.
    pub fn known<'a, I>(&self, names: I) -> SecretValueMap
    where
        I: IntoIterator<Item = &'a SecretName>,
    {
        names
            .into_iter()
            .filter_map(|name| self.get(name).map(|v| (name.clone(), v.to_string())))
            .collect()
    }

    /// Record every entry of `values`.
    pub fn extend(&mut self, values: SecretValueMap) {
        for (name, value) in values {
            self.set(name, value);
        }
    }

    /// All names that currently have a value.
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
            .filter(|(_, v)| !v.is_empty())
    }

    /// Number of names seen.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no names were seen.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
