//! Injectable payloads and their dispatch.
//!
//! Injectables are encrypted assets the authority releases with a
//! successful check. A processor decrypts them with the shared secret,
//! optionally verifies their signature first, and applies them under a
//! destination directory. The default processor writes files; callers can
//! plug in their own.

use devpayr_crypto::{decrypt_string, verify_hex, CryptoError, SharedKey};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Result type for injectable processing.
pub type InjectableResult<T> = Result<T, InjectableError>;

/// Errors from injectable processing.
#[derive(Debug, Error)]
pub enum InjectableError {
    /// No shared secret is configured.
    #[error("a secret is required to decrypt injectables")]
    MissingSecret,

    /// Verification is on but the payload carries no signature.
    #[error("injectable '{0}' has no signature")]
    MissingSignature(String),

    /// The target path is absolute or escapes the destination directory.
    #[error("injectable '{slug}' targets an unsafe path: {target}")]
    UnsafeTarget { slug: String, target: String },

    /// Signature check or decryption failed.
    #[error("injectable crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Writing the decrypted content failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// How decrypted content is combined with an existing target file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectMode {
    /// Overwrite the target.
    #[default]
    Replace,
    /// Add after existing content.
    Append,
    /// Add before existing content.
    Prepend,
}

/// An encrypted asset as delivered by the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectablePayload {
    /// Stable identifier; also the default file name.
    pub slug: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// `base64(nonce || ciphertext)` under the shared secret.
    pub encrypted_content: String,
    /// Hex HMAC-SHA256 of `encrypted_content` under the shared secret.
    #[serde(default)]
    pub signature: Option<String>,
    /// Destination relative to the injectables directory.
    #[serde(default)]
    pub target_path: Option<String>,
    /// How to combine with an existing file.
    #[serde(default)]
    pub mode: InjectMode,
}

/// Inputs every processor receives.
#[derive(Clone, PartialEq, Eq)]
pub struct InjectableOptions {
    /// Shared secret used for decryption and signatures.
    pub secret: Option<String>,
    /// Destination directory.
    pub path: PathBuf,
    /// Require a valid signature before applying.
    pub verify: bool,
}

impl std::fmt::Debug for InjectableOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectableOptions")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("path", &self.path)
            .field("verify", &self.verify)
            .finish()
    }
}

/// An injectable that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedInjectable {
    /// The payload's slug.
    pub slug: String,
    /// Why it was skipped.
    pub reason: String,
}

/// What a dispatch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Files written, in payload order.
    pub applied: Vec<PathBuf>,
    /// Payloads that were skipped.
    pub failed: Vec<FailedInjectable>,
}

impl DispatchReport {
    /// True if every payload was applied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Decrypts, verifies and applies injectables.
pub trait InjectableProcessor: Send + Sync {
    /// Processes `payloads` in order.
    ///
    /// A failure for one payload should be reported, not abort the rest.
    fn decrypt_and_apply(
        &self,
        payloads: &[InjectablePayload],
        options: &InjectableOptions,
    ) -> InjectableResult<DispatchReport>;
}

impl<F> InjectableProcessor for F
where
    F: Fn(&[InjectablePayload], &InjectableOptions) -> InjectableResult<DispatchReport>
        + Send
        + Sync,
{
    fn decrypt_and_apply(
        &self,
        payloads: &[InjectablePayload],
        options: &InjectableOptions,
    ) -> InjectableResult<DispatchReport> {
        self(payloads, options)
    }
}

/// Writes decrypted injectables to files under the destination directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDispatcher;

impl InjectableProcessor for DefaultDispatcher {
    fn decrypt_and_apply(
        &self,
        payloads: &[InjectablePayload],
        options: &InjectableOptions,
    ) -> InjectableResult<DispatchReport> {
        let secret = options
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(InjectableError::MissingSecret)?;
        let key = SharedKey::from_secret(secret)?;

        let mut report = DispatchReport::default();
        for payload in payloads {
            match apply_one(payload, secret, &key, options) {
                Ok(path) => {
                    info!(slug = %payload.slug, path = %path.display(), "Applied injectable");
                    report.applied.push(path);
                }
                Err(e) => {
                    warn!(slug = %payload.slug, error = %e, "Skipping injectable");
                    report.failed.push(FailedInjectable {
                        slug: payload.slug.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}

fn apply_one(
    payload: &InjectablePayload,
    secret: &str,
    key: &SharedKey,
    options: &InjectableOptions,
) -> InjectableResult<PathBuf> {
    let target = resolve_target(payload, &options.path)?;

    if options.verify {
        let signature = payload
            .signature
            .as_deref()
            .ok_or_else(|| InjectableError::MissingSignature(payload.slug.clone()))?;
        verify_hex(
            secret.as_bytes(),
            payload.encrypted_content.trim().as_bytes(),
            signature,
        )?;
    }

    let plaintext = decrypt_string(key, &payload.encrypted_content)?;
    write_with_mode(&target, &plaintext, payload.mode)?;
    Ok(target)
}

/// Joins the payload's target onto `base`, refusing anything that could
/// land outside it.
fn resolve_target(payload: &InjectablePayload, base: &Path) -> InjectableResult<PathBuf> {
    let relative = payload
        .target_path
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&payload.slug);

    let unsafe_target = || InjectableError::UnsafeTarget {
        slug: payload.slug.clone(),
        target: relative.to_string(),
    };

    let relative_path = Path::new(relative);
    if relative.is_empty()
        || !relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(unsafe_target());
    }

    Ok(base.join(relative_path))
}

fn write_with_mode(target: &Path, content: &str, mode: InjectMode) -> InjectableResult<()> {
    let io_err = |source: std::io::Error| InjectableError::Io {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    match mode {
        InjectMode::Replace => fs::write(target, content).map_err(io_err),
        InjectMode::Append => OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .map_err(io_err),
        InjectMode::Prepend => {
            let existing = match fs::read_to_string(target) {
                Ok(existing) => existing,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(io_err(e)),
            };
            fs::write(target, format!("{content}{existing}")).map_err(io_err)
        }
    }
}
