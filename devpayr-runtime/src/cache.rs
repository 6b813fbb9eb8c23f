//! Same-day validation cache.
//!
//! One file per (license, identity) pair, named by a SHA-256 key and
//! holding the UTC date of the last successful check. An entry is valid
//! only while its date equals today: validity rolls over at UTC midnight,
//! not after 24 hours.

use crate::clock::{Clock, SystemClock};
use crate::identity::Identity;
use crate::persist::{read_trimmed, write_best_effort, Persisted};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of every cache key.
pub const CACHE_KEY_PREFIX: &str = "devpayr_";

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".devpayr-cache";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `devpayr_` + hex SHA-256 of `license::identity`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a license and identity.
    #[must_use]
    pub fn derive(license: &str, identity: &Identity) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(license.as_bytes());
        hasher.update(b"::");
        hasher.update(identity.as_str().as_bytes());
        Self(format!("{CACHE_KEY_PREFIX}{}", hex::encode(hasher.finalize())))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the cache directory: the configured path if non-blank,
/// otherwise `.devpayr-cache` under the working directory.
#[must_use]
pub fn resolve_cache_dir(configured: Option<&Path>) -> PathBuf {
    let configured = configured
        .map(|p| p.to_string_lossy().trim().to_string())
        .filter(|p| !p.is_empty());
    let base = std::env::current_dir().unwrap_or_default();
    match configured {
        Some(path) => base.join(path),
        None => base.join(DEFAULT_CACHE_DIR),
    }
}

/// The cache entry for one key.
#[derive(Clone)]
pub struct ValidationCache {
    dir: PathBuf,
    key: CacheKey,
    clock: Arc<dyn Clock>,
}

impl ValidationCache {
    /// A cache entry under `dir`, dated by the system clock.
    pub fn new(dir: impl Into<PathBuf>, key: CacheKey) -> Self {
        Self::with_clock(dir, key, Arc::new(SystemClock))
    }

    /// A cache entry dated by `clock`.
    pub fn with_clock(dir: impl Into<PathBuf>, key: CacheKey, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            key,
            clock,
        }
    }

    /// The key this entry is stored under.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Path of the entry's file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.key))
    }

    /// True if the entry records a success dated today.
    ///
    /// Missing, unreadable and partially written files are misses.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        read_trimmed(&self.file_path()).is_some_and(|stored| stored == self.today())
    }

    /// Records a success dated today.
    pub fn record_success(&self) -> Persisted {
        write_best_effort(&self.file_path(), &self.today())
    }

    fn today(&self) -> String {
        self.clock.today().format(DATE_FORMAT).to_string()
    }
}

impl fmt::Debug for ValidationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCache")
            .field("dir", &self.dir)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
