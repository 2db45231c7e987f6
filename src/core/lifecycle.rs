//! Secret lifecycle.
//!
//! For every key group: fetch the stored blob and decrypt it, or provision
//! the missing values, encrypt them and push a new blob. Blob contents always
//! win over values supplied by the caller; pushing only happens when there
//! is no blob or value rotation was requested.

use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::context::ResolutionContext;
use crate::core::domain::EncryptedBlob;
use crate::core::kms::KeyManagementClient;
use crate::core::provision::SecretValueProvisioner;
use crate::core::store::SecretStore;
use crate::core::types::{KeyGroups, KeyName, SecretName, SecretValueMap, VersionId};
use crate::error::{Result, TransportError};

/// What happened to one key group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Values came from the stored blob.
    Fetched { secrets: usize },
    /// Values were provisioned and a new blob was pushed.
    Pushed {
        secrets: usize,
        generated: Vec<SecretName>,
        version: VersionId,
    },
    /// The group declares no secrets.
    Skipped,
}

/// Per-key outcomes of a resolve run, in key order.
pub type ResolveReport = Vec<(KeyName, GroupOutcome)>;

/// Resolves key groups against a KMS and a blob store.
pub struct SecretLifecycle<'a, K: ?Sized, S: ?Sized> {
    kms: &'a K,
    store: &'a S,
    provisioner: SecretValueProvisioner,
}

impl<'a, K, S> SecretLifecycle<'a, K, S>
where
    K: KeyManagementClient + ?Sized,
    S: SecretStore + ?Sized,
{
    pub fn new(kms: &'a K, store: &'a S) -> Self {
        Self {
            kms,
            store,
            provisioner: SecretValueProvisioner::new(),
        }
    }

    /// Make every secret of every group available in `ctx`.
    ///
    /// With `force_rotate_values` the store is not consulted: values are
    /// taken from `ctx` where present, generated otherwise, and pushed.
    ///
    /// # Errors
    ///
    /// The first failure aborts the whole run; groups resolved before it
    /// keep whatever they pushed.
    pub fn resolve(
        &mut self,
        groups: &KeyGroups,
        ctx: &mut ResolutionContext,
        force_rotate_values: bool,
    ) -> Result<ResolveReport> {
        let mut report = Vec::with_capacity(groups.len());

        for (key, secrets) in groups {
            if secrets.is_empty() {
                debug!(key = %key, "no secrets declared, skipping");
                report.push((key.clone(), GroupOutcome::Skipped));
                continue;
            }

            if !force_rotate_values {
                if let Some(values) = self.fetch(key)? {
                    let count = values.len();
                    ctx.extend(values);
                    report.push((key.clone(), GroupOutcome::Fetched { secrets: count }));
                    continue;
                }
            }

            info!(key = %key, "populating secrets");
            let provisioned = self.provisioner.populate(secrets, &ctx.known(secrets));
            ctx.extend(provisioned.values.clone());
            let version = self.push(key, &provisioned.values)?;

            report.push((
                key.clone(),
                GroupOutcome::Pushed {
                    secrets: provisioned.values.len(),
                    generated: provisioned.generated,
                    version,
                },
            ));
        }

        Ok(report)
    }

    /// Download and decrypt the blob for `key`.
    ///
    /// Returns `None` when no blob exists.
    pub fn fetch(&self, key: &str) -> Result<Option<SecretValueMap>> {
        debug!(key, "checking for stored secrets");
        if !self.store.exists(key)? {
            info!(key, "encrypted secrets missing from store");
            return Ok(None);
        }

        let body = self.store.download(key)?;
        let blob = EncryptedBlob::open(key, &body)?;
        info!(
            key,
            version = blob.version().as_deref().unwrap_or("unknown"),
            "decrypting secrets"
        );

        let plaintext = Zeroizing::new(self.kms.decrypt(key, &blob.ciphertext_bytes(key)?)?);
        let values: SecretValueMap = serde_json::from_slice(&plaintext).map_err(|_| {
            TransportError::malformed(
                "decrypt",
                key,
                format!("<{} bytes of undecodable plaintext>", plaintext.len()),
            )
        })?;

        debug!(key, secrets = values.len(), "fetched secrets");
        Ok(Some(values))
    }

    /// Encrypt `values` under the primary version of `key` and upload them.
    ///
    /// Returns the version that encrypted the blob.
    pub fn push(&self, key: &str, values: &SecretValueMap) -> Result<VersionId> {
        let version = self.kms.primary_version(key)?;
        info!(key, version = %version, "encrypting secrets");

        let plaintext = Zeroizing::new(serde_json::to_vec(values).map_err(|e| {
            crate::error::Error::Other(format!("failed to serialize secrets: {}", e))
        })?);
        let ciphertext = self.kms.encrypt(key, &version, &plaintext)?;

        let blob = EncryptedBlob::new(&ciphertext, self.kms.version_name(key, &version));
        info!(key, "uploading encrypted secrets");
        self.store.upload(key, &blob.seal()?)?;

        Ok(version)
    }
}
