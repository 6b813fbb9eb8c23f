//! Shared-secret keys.

use crate::error::{CryptoError, CryptoResult};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the symmetric key in bytes (256 bits for ChaCha20).
pub const KEY_SIZE: usize = 32;

/// A symmetric key derived from the project's shared secret.
///
/// The raw secret is hashed once; the secret string itself is never stored.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedKey {
    bytes: [u8; KEY_SIZE],
}

impl SharedKey {
    /// Derives the key as `SHA-256(secret)`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] if `secret` is empty.
    pub fn from_secret(secret: &str) -> CryptoResult<Self> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        let digest = Sha256::digest(secret.as_bytes());
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&digest);
        Ok(Self { bytes })
    }

    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for SharedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
