//! Persisted deployment fingerprint.
//!
//! When no routable domain can be determined (local development,
//! ephemeral containers) the deployment is identified by a random value
//! stored once per user profile. It stays stable across restarts for as
//! long as the file survives.

use crate::persist::{read_trimmed, write_best_effort, Persisted};
use rand::RngCore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the user's home that holds the fingerprint.
pub const FINGERPRINT_DIR: &str = ".devpayr";

/// File name of the fingerprint.
pub const FINGERPRINT_FILE: &str = "rust-sdk-fingerprint";

/// Random bytes in a freshly generated fingerprint (32 hex chars).
const FINGERPRINT_BYTES: usize = 16;

/// Reads and creates the fingerprint file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintStore {
    path: PathBuf,
}

impl FingerprintStore {
    /// A store backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The per-user store at `~/.devpayr/rust-sdk-fingerprint`.
    ///
    /// Falls back to the temporary directory when there is no home.
    #[must_use]
    pub fn user_default() -> Self {
        let base = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(FINGERPRINT_DIR).join(FINGERPRINT_FILE))
    }

    /// Location of the fingerprint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored fingerprint if the file holds a well-formed one.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        read_trimmed(&self.path).filter(|value| is_fingerprint(value))
    }

    /// Generates a new fingerprint and tries to store it.
    ///
    /// The value is returned even when it could not be written.
    pub fn create_and_persist(&self) -> String {
        let fingerprint = generate();
        match write_best_effort(&self.path, &fingerprint) {
            Persisted::Stored => {
                debug!(path = %self.path.display(), "Stored new deployment fingerprint");
            }
            Persisted::NonFatal(_) => {
                debug!("Using an unpersisted fingerprint for this process");
            }
        }
        fingerprint
    }
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self::user_default()
    }
}

/// True for lowercase hex strings of exactly 32 or 64 characters.
#[must_use]
pub fn is_fingerprint(value: &str) -> bool {
    matches!(value.len(), 32 | 64)
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

fn generate() -> String {
    let mut bytes = [0u8; FINGERPRINT_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
