//! The validate-and-cache state machine.
//!
//! ```text
//! INIT -> cache hit -> DONE_CACHED
//!      -> cache miss / recheck -> CALLING -> unauthorized -> FAILED
//!                                         -> authorized -> CACHING -> DISPATCH_CHECK
//!                                                          -> PROCESSING -> DONE
//!                                                          -> DONE
//! ```

use crate::authority::{CheckRequest, LicenseAuthority, ValidationOutcome};
use crate::cache::{resolve_cache_dir, CacheKey, ValidationCache};
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::identity::Identity;
use crate::injectable::{DefaultDispatcher, DispatchReport, InjectableProcessor};
use crate::persist::Persisted;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message reported when the authority denies the license.
pub const UNAUTHORIZED_MESSAGE: &str = "Project is unpaid or unauthorized.";

/// Message reported for a cache hit.
pub const CACHED_MESSAGE: &str = "License validated from cache";

/// What happened to the injectables of a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Dispatch was disabled or there was nothing to dispatch.
    Skipped,
    /// The processor ran.
    Completed(DispatchReport),
    /// The processor refused to run. Authorization still stands.
    Failed(String),
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    /// A same-day cache entry made the network call unnecessary.
    Cached,
    /// The authority confirmed the license.
    Checked {
        /// The authority's answer.
        outcome: ValidationOutcome,
        /// What happened to its injectables.
        dispatch: DispatchStatus,
    },
}

impl ValidationReport {
    /// True if served from the cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached)
    }

    /// The authority's answer, absent for cache hits.
    #[must_use]
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        match self {
            Self::Cached => None,
            Self::Checked { outcome, .. } => Some(outcome),
        }
    }

    /// Injectable dispatch status; `Skipped` for cache hits.
    #[must_use]
    pub fn dispatch(&self) -> &DispatchStatus {
        match self {
            Self::Cached => &DispatchStatus::Skipped,
            Self::Checked { dispatch, .. } => dispatch,
        }
    }
}

/// Validates one license for one deployment identity.
#[derive(Debug)]
pub struct RuntimeValidator<'a> {
    config: &'a RuntimeConfig,
    license: &'a str,
    identity: Identity,
    cache: ValidationCache,
}

impl<'a> RuntimeValidator<'a> {
    /// Creates a validator dated by the system clock.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Configuration`] if no license key is configured.
    pub fn new(config: &'a RuntimeConfig, identity: Identity) -> RuntimeResult<Self> {
        Self::with_clock(config, identity, Arc::new(SystemClock))
    }

    /// Creates a validator whose cache is dated by `clock`.
    pub fn with_clock(
        config: &'a RuntimeConfig,
        identity: Identity,
        clock: Arc<dyn Clock>,
    ) -> RuntimeResult<Self> {
        let license = config.license_key()?;
        let key = CacheKey::derive(license, &identity);
        let dir = resolve_cache_dir(config.cache_path.as_deref());

        Ok(Self {
            config,
            license,
            identity,
            cache: ValidationCache::with_clock(dir, key, clock),
        })
    }

    /// The identity this validator checks.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The cache entry for this license and identity.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Runs one validation cycle.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Unauthorized`] if the authority denies the license,
    /// [`RuntimeError::Transport`] if it cannot be asked.
    pub async fn validate(&self, authority: &dyn LicenseAuthority) -> RuntimeResult<ValidationReport> {
        if !self.config.recheck && self.cache.is_fresh() {
            info!(identity = %self.identity, "{CACHED_MESSAGE}");
            return Ok(ValidationReport::Cached);
        }

        debug!(identity = %self.identity, recheck = self.config.recheck, "Calling license authority");
        let request = CheckRequest {
            license: self.license,
            identity: &self.identity,
            action: &self.config.action,
            include_injectables: self.config.injectables,
        };
        let outcome = authority.check(&request).await?;

        if !outcome.authorized {
            debug!(identity = %self.identity, "Authority denied license");
            return Err(RuntimeError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()));
        }
        info!(
            identity = %self.identity,
            injectables = outcome.injectables.len(),
            "License authorized"
        );

        if let Persisted::NonFatal(reason) = self.cache.record_success() {
            debug!(reason = %reason, "Validation not cached");
        }

        let processor = self.processor();
        let dispatch = if self.should_dispatch(&outcome) {
            debug!(count = outcome.injectables.len(), "Dispatching injectables");
            match processor.decrypt_and_apply(&outcome.injectables, &self.config.injectable_options()) {
                Ok(report) => DispatchStatus::Completed(report),
                Err(e) => {
                    warn!(error = %e, "Injectable dispatch failed");
                    DispatchStatus::Failed(e.to_string())
                }
            }
        } else {
            DispatchStatus::Skipped
        };

        Ok(ValidationReport::Checked { outcome, dispatch })
    }

    fn processor(&self) -> Arc<dyn InjectableProcessor> {
        self.config
            .injectables_processor
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultDispatcher))
    }

    fn should_dispatch(&self, outcome: &ValidationOutcome) -> bool {
        self.config.injectables && self.config.handle_injectables && !outcome.injectables.is_empty()
    }
}
