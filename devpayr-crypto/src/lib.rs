//! Cryptography for DevPayr injectables.
//!
//! Injectables are delivered encrypted under a secret shared between the
//! project owner and the DevPayr authority. This crate provides:
//! - Key derivation from the shared secret (SHA-256)
//! - Authenticated decryption with ChaCha20-Poly1305
//! - HMAC-SHA256 signatures proving a payload came from the secret holder

mod cipher;
mod error;
mod key;
mod signature;

pub use cipher::{
    decrypt, decrypt_string, encrypt, encrypt_string, EncryptedData, NONCE_SIZE, TAG_SIZE,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{SharedKey, KEY_SIZE};
pub use signature::{sign_hex, verify_hex};
