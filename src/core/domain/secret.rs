//! Secret kind.
//!
//! The prefix of a secret name decides how its value is generated.

use base64::Engine;
use rand::RngCore;

use crate::core::constants::{CIPHER_KEY_LEN, CIPHER_KEY_PREFIX, TOKEN_LEN, TOKEN_PREFIX};

/// How a secret's value is produced when nobody supplied one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    /// `secret_*`: random token, lowercase hex
    Token,
    /// `key_*`: AES-256 key material, base64
    CipherKey,
}

impl SecretKind {
    /// Classify a secret name by its prefix.
    ///
    /// Returns `None` when the name carries neither prefix.
    pub fn of(name: &str) -> Option<Self> {
        if name.starts_with(TOKEN_PREFIX) {
            Some(Self::Token)
        } else if name.starts_with(CIPHER_KEY_PREFIX) {
            Some(Self::CipherKey)
        } else {
            None
        }
    }

    /// Generate a fresh value from the operating system's CSPRNG.
    pub fn generate(self) -> String {
        self.generate_with(&mut rand::rngs::OsRng)
    }

    /// Generate a fresh value from the given RNG.
    pub fn generate_with<R: RngCore + ?Sized>(self, rng: &mut R) -> String {
        match self {
            Self::Token => {
                let mut bytes = [0u8; TOKEN_LEN];
                rng.fill_bytes(&mut bytes);
                hex::encode(bytes)
            }
            Self::CipherKey => {
                let mut key = [0u8; CIPHER_KEY_LEN];
                rng.fill_bytes(&mut key);
                base64::engine::general_purpose::STANDARD.encode(key)
            }
        }
    }
}
