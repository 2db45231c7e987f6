//! Domain types.

mod blob;
mod key_version;
mod module;
mod secret;

pub use blob::EncryptedBlob;
pub use key_version::{version_id_from_path, KeyVersion, KeyVersionState};
pub use module::{Module, ModuleManifest};
pub use secret::SecretKind;
