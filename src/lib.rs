//! Strongbox - KMS-backed secrets for infrastructure modules.
//!
//! Each deployment module declares the secrets it needs. Strongbox groups
//! them by encryption key, fetches the encrypted blob for every key from
//! object storage, and provisions missing values on first use. Provisioning
//! tools receive the result as `TF_VAR_` environment variables.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── check         # Validate manifests
//! │   ├── export        # Resolve and print the environment
//! │   ├── run           # Run with injected secrets
//! │   ├── rotate        # Rotate an encryption key
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # strongbox.toml management
//!     ├── context       # Resolution context (known values)
//!     ├── domain/       # Modules, secret kinds, key versions, blobs
//!     ├── manifest      # Discovery, validation, grouping by key
//!     ├── provision     # Value generation
//!     ├── lifecycle     # Fetch or provision, encrypt, push
//!     ├── rotation      # Key version rotation
//!     ├── env           # Exported environment
//!     ├── kms/          # Key management backends
//!     │   ├── mod       # KeyManagementClient trait
//!     │   ├── gcp       # Cloud KMS via gcloud
//!     │   └── memory    # In-process key ring
//!     └── store/        # Blob storage backends
//!         ├── mod       # SecretStore trait
//!         ├── gcs       # Cloud Storage JSON API
//!         ├── fs        # Local directory
//!         └── memory    # In-process store
//! ```
//!
//! # Features
//!
//! - One encrypted blob per encryption key, decrypted on every run
//! - Missing values generated on first use, never overwritten afterwards
//! - Key rotation that never leaves a key without an enabled version
//! - Extensible KMS and storage backends

pub mod cli;
pub mod core;
pub mod error;
