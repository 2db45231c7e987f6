//! Shared setup for commands that work on the module tree.

use std::path::Path;
use tracing::debug;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::context::ResolutionContext;
use crate::core::domain::Module;
use crate::core::env::{ExportOptions, Exported};
use crate::core::kms;
use crate::core::lifecycle::{GroupOutcome, SecretLifecycle};
use crate::core::manifest::{self, EncryptionKeyConfig, ManifestCollector};
use crate::core::store;
use crate::core::types::KeyGroups;
use crate::error::Result;

/// Configuration, key allow-list and discovered modules.
pub struct Workspace {
    pub config: Config,
    pub key_config: EncryptionKeyConfig,
    pub modules: Vec<Module>,
}

impl Workspace {
    /// Load everything a command needs from disk.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        let key_config = EncryptionKeyConfig::load(config.key_config_path())?;
        let modules = manifest::discover(config.modules_dir())?;
        debug!(
            modules = modules.len(),
            keys = key_config.keys().len(),
            "loaded workspace"
        );

        Ok(Self {
            config,
            key_config,
            modules,
        })
    }

    /// Validate manifests and group their secrets by key.
    pub fn collect(&self, ctx: &mut ResolutionContext) -> Result<KeyGroups> {
        ManifestCollector::new(&self.key_config).collect(&self.modules, ctx)
    }

    /// Full run: collect, resolve every group, build the environment.
    pub fn resolve(&self, rotate_secrets: bool) -> Result<Exported> {
        let mut ctx = ResolutionContext::from_env();
        let groups = self.collect(&mut ctx)?;

        let kms = kms::from_config(&self.config)?;
        let store = store::from_config(&self.config)?;

        let report = SecretLifecycle::new(&kms, &store).resolve(&groups, &mut ctx, rotate_secrets)?;
        for (key, outcome) in &report {
            match outcome {
                GroupOutcome::Fetched { secrets } => {
                    output::kv(&output::key(key), format!("fetched {} secrets", secrets))
                }
                GroupOutcome::Pushed {
                    secrets,
                    generated,
                    version,
                } => output::kv(
                    &output::key(key),
                    format!(
                        "pushed {} secrets ({} generated) with version {}",
                        secrets,
                        generated.len(),
                        version
                    ),
                ),
                GroupOutcome::Skipped => output::kv(&output::key(key), "no secrets"),
            }
        }

        Ok(Exported::build(
            &ctx,
            &groups,
            &self.key_config,
            &ExportOptions {
                keyring: &self.config.kms.keyring,
                legacy_state_key: self.config.compat.google_encryption_key,
            },
        ))
    }
}
