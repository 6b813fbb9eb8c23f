//! HMAC-SHA256 signatures over injectable content.

use crate::error::{CryptoError, CryptoResult};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed(secret: &[u8]) -> CryptoResult<HmacSha256> {
    HmacSha256::new_from_slice(secret)
        .map_err(|e| CryptoError::InvalidKey(format!("invalid signing secret: {e}")))
}

/// Signs `message` with `secret` and returns the lowercase hex MAC.
///
/// # Errors
///
/// [`CryptoError::InvalidKey`] if the MAC cannot be keyed with `secret`.
pub fn sign_hex(secret: &[u8], message: &[u8]) -> CryptoResult<String> {
    let mut mac = keyed(secret)?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex MAC produced by [`sign_hex`].
///
/// Comparison is constant-time over the decoded bytes. Hex case is ignored.
///
/// # Errors
///
/// [`CryptoError::Encoding`] if `provided_hex` is not hex,
/// [`CryptoError::SignatureMismatch`] if it does not match.
pub fn verify_hex(secret: &[u8], message: &[u8], provided_hex: &str) -> CryptoResult<()> {
    let provided = hex::decode(provided_hex.trim())
        .map_err(|e| CryptoError::Encoding(format!("invalid signature hex: {e}")))?;
    let mut mac = keyed(secret)?;
    mac.update(message);
    mac.verify_slice(&provided)
        .map_err(|_| CryptoError::SignatureMismatch)
}
