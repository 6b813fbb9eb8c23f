//! Deployment identity resolution.
//!
//! Precedence is fixed: user-supplied domain, then environment inference,
//! then the stored fingerprint, then a freshly generated one. Resolution
//! always produces an identity.

use crate::environment::{infer_domain, EnvSource, ProcessEnv};
use crate::fingerprint::FingerprintStore;
use crate::hostname::normalize;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The value a license check and its cache are bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Identity {
    /// A canonical DNS hostname.
    Domain(String),
    /// A locally generated hex fingerprint.
    Fingerprint(String),
}

impl Identity {
    /// The identity string sent to the authority and hashed into cache keys.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Domain(value) | Self::Fingerprint(value) => value,
        }
    }

    /// True if this identity is a hostname.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// The configured `domain` option.
    Configured,
    /// A process environment variable.
    Environment,
    /// The fingerprint file.
    StoredFingerprint,
    /// Generated during this resolution.
    NewFingerprint,
}

/// Turns optional user input into an [`Identity`].
#[derive(Debug, Clone)]
pub struct IdentityResolver<E = ProcessEnv> {
    env: E,
    store: FingerprintStore,
}

impl IdentityResolver<ProcessEnv> {
    /// Resolver over the process environment and the per-user fingerprint.
    #[must_use]
    pub fn system() -> Self {
        Self::new(ProcessEnv, FingerprintStore::user_default())
    }
}

impl Default for IdentityResolver<ProcessEnv> {
    fn default() -> Self {
        Self::system()
    }
}

impl<E: EnvSource> IdentityResolver<E> {
    /// Resolver over an explicit environment and fingerprint store.
    pub fn new(env: E, store: FingerprintStore) -> Self {
        Self { env, store }
    }

    /// The fingerprint store this resolver falls back to.
    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Resolves the identity for this deployment.
    pub fn resolve(&self, user_supplied: Option<&str>) -> Identity {
        self.resolve_with_source(user_supplied).0
    }

    /// Like [`resolve`](Self::resolve), also reporting which step won.
    pub fn resolve_with_source(&self, user_supplied: Option<&str>) -> (Identity, IdentitySource) {
        let (identity, source) = if let Some(host) = normalize(user_supplied) {
            (Identity::Domain(host), IdentitySource::Configured)
        } else if let Some(host) = infer_domain(&self.env) {
            (Identity::Domain(host), IdentitySource::Environment)
        } else if let Some(fp) = self.store.read() {
            (Identity::Fingerprint(fp), IdentitySource::StoredFingerprint)
        } else {
            (
                Identity::Fingerprint(self.store.create_and_persist()),
                IdentitySource::NewFingerprint,
            )
        };

        debug!(identity = %identity, source = ?source, "Resolved deployment identity");
        (identity, source)
    }
}
