//! One-call SDK bootstrap.
//!
//! Checks configuration, resolves the deployment identity, validates the
//! license and routes any failure. Only a configuration error escapes to
//! the caller.

use crate::authority::LicenseAuthority;
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::environment::{EnvSource, ProcessEnv};
use crate::error::RuntimeResult;
use crate::failure::{FailureOutcome, FailureRouter, HeadlessSurface, HostSurface};
use crate::identity::{Identity, IdentityResolver};
use crate::validator::{RuntimeValidator, ValidationReport};
use std::sync::Arc;
use tracing::{info, warn};

type ReadyHook = Box<dyn FnOnce(&ValidationReport) + Send>;

/// How a bootstrap ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The license is valid for `identity`.
    Ready {
        identity: Identity,
        report: ValidationReport,
    },
    /// Validation failed and was handed to the failure router.
    Rejected {
        identity: Identity,
        message: String,
        handled: FailureOutcome,
    },
}

impl BootstrapOutcome {
    /// The identity the check was bound to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        match self {
            Self::Ready { identity, .. } | Self::Rejected { identity, .. } => identity,
        }
    }

    /// True if the license was accepted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Builder for a single bootstrap run.
pub struct Bootstrap<E = ProcessEnv> {
    config: RuntimeConfig,
    resolver: IdentityResolver<E>,
    surface: Arc<dyn HostSurface>,
    clock: Arc<dyn Clock>,
    on_ready: Option<ReadyHook>,
}

impl Bootstrap<ProcessEnv> {
    /// A bootstrap over the process environment and a headless surface.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            resolver: IdentityResolver::system(),
            surface: Arc::new(HeadlessSurface),
            clock: Arc::new(SystemClock),
            on_ready: None,
        }
    }
}

impl<E: EnvSource> Bootstrap<E> {
    /// Uses `resolver` for identity resolution.
    pub fn resolver<E2: EnvSource>(self, resolver: IdentityResolver<E2>) -> Bootstrap<E2> {
        Bootstrap {
            config: self.config,
            resolver,
            surface: self.surface,
            clock: self.clock,
            on_ready: self.on_ready,
        }
    }

    /// Presents failures through `surface`.
    #[must_use]
    pub fn surface(mut self, surface: Arc<dyn HostSurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Dates the validation cache with `clock`.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Called with the report once the license is accepted.
    #[must_use]
    pub fn on_ready(mut self, hook: impl FnOnce(&ValidationReport) + Send + 'static) -> Self {
        self.on_ready = Some(Box::new(hook));
        self
    }

    /// The configuration this bootstrap runs with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Runs the bootstrap against `authority`.
    ///
    /// # Errors
    ///
    /// Only [`RuntimeError::Configuration`](crate::RuntimeError::Configuration),
    /// before any identity, cache or network work. Authorization and
    /// transport failures are routed and reported as
    /// [`BootstrapOutcome::Rejected`].
    pub async fn run(self, authority: &dyn LicenseAuthority) -> RuntimeResult<BootstrapOutcome> {
        self.config.license_key()?;

        let identity = self.resolver.resolve(self.config.domain.as_deref());
        let validator =
            RuntimeValidator::with_clock(&self.config, identity.clone(), self.clock.clone())?;

        match validator.validate(authority).await {
            Ok(report) => {
                if let Some(hook) = self.on_ready {
                    hook(&report);
                }
                Ok(BootstrapOutcome::Ready { identity, report })
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let message = e.failure_message();
                warn!(identity = %identity, error = %message, "License validation failed");
                let handled = FailureRouter::new(&self.config, self.surface.clone()).route(&message);
                info!(handled = ?handled, "Routed license failure");
                Ok(BootstrapOutcome::Rejected {
                    identity,
                    message,
                    handled,
                })
            }
        }
    }
}

/// Bootstraps against the DevPayr HTTP API described by `config`.
///
/// # Errors
///
/// [`RuntimeError::Configuration`](crate::RuntimeError::Configuration) if
/// the license is missing or the HTTP client cannot be built.
#[cfg(feature = "online")]
pub async fn bootstrap(config: RuntimeConfig) -> RuntimeResult<BootstrapOutcome> {
    use crate::authority::HttpAuthority;
    use crate::error::RuntimeError;

    config.license_key()?;
    let authority = HttpAuthority::from_config(&config)
        .map_err(|e| RuntimeError::Configuration(e.to_string()))?;
    Bootstrap::new(config).run(&authority).await
}
