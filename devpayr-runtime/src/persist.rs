//! Best-effort file persistence for the cache and fingerprint.
//!
//! Writes never fail the caller: an error becomes [`Persisted::NonFatal`]
//! and callers treat it exactly like "nothing was written". Reads that
//! fail for any reason look like an absent file.

use std::fs;
use std::path::Path;
use tracing::warn;

/// Outcome of a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Persisted {
    /// The value is on disk.
    Stored,
    /// The write failed; the value only lives for this process.
    NonFatal(String),
}

impl Persisted {
    /// True if the value reached disk.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}

/// Creates the parent directory and writes `contents` to `path`.
pub(crate) fn write_best_effort(path: &Path, contents: &str) -> Persisted {
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, contents));

    match result {
        Ok(()) => Persisted::Stored,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping persistence");
            Persisted::NonFatal(e.to_string())
        }
    }
}

/// Reads `path` and trims it. Absent, unreadable and empty files give `None`.
pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
