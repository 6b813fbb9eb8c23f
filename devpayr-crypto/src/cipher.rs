//! Injectable content sealing with ChaCha20-Poly1305.
//!
//! Wire form is `base64(nonce || ciphertext || tag)`, the same layout the
//! authority uses for `encrypted_content`.

use crate::error::{CryptoError, CryptoResult};
use crate::key::SharedKey;
use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of nonce in bytes (96 bits for ChaCha20-Poly1305).
pub const NONCE_SIZE: usize = 12;

/// Size of authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Sealed injectable content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Per-message nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext with the authentication tag appended.
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Encodes as `base64(nonce || ciphertext)`.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(&bytes)
    }

    /// Decodes the wire form. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::Decryption(format!(
                "content too short ({} bytes)",
                bytes.len()
            )));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Seals `plaintext` under `key` with a fresh random nonce.
pub fn encrypt(key: &SharedKey, plaintext: &[u8]) -> CryptoResult<EncryptedData> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedData { nonce, ciphertext })
}

/// Opens sealed content. Fails if the key is wrong or any byte was altered.
pub fn decrypt(key: &SharedKey, sealed: &EncryptedData) -> CryptoResult<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_ref())
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong secret or tampered content)".into())
        })
}

/// Seals a string and returns the wire form.
pub fn encrypt_string(key: &SharedKey, plaintext: &str) -> CryptoResult<String> {
    Ok(encrypt(key, plaintext.as_bytes())?.to_base64())
}

/// Opens wire-form content that is expected to hold UTF-8 text.
pub fn decrypt_string(key: &SharedKey, encoded: &str) -> CryptoResult<String> {
    let sealed = EncryptedData::from_base64(encoded)?;
    let plaintext = decrypt(key, &sealed)?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::Decryption(format!("invalid UTF-8: {e}")))
}
