//! Error types for injectable cryptography.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while sealing, opening or verifying injectables.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The shared secret is empty.
    #[error("shared secret must not be empty")]
    EmptySecret,

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong secret or tampered content).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Content is not valid base64 or hex.
    #[error("invalid encoding: {0}")]
    Encoding(String),

    /// The signing secret cannot key the MAC.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature did not match the content.
    #[error("signature mismatch")]
    SignatureMismatch,
}
