//! Runtime licensing for applications distributed through DevPayr.
//!
//! On each start the host calls [`bootstrap`] (or builds a [`Bootstrap`]).
//! This crate then:
//! - Resolves a stable deployment identity: the configured domain, a domain
//!   inferred from the environment, or a persisted random fingerprint
//! - Skips the network when a same-day success is cached and `recheck` is off
//! - Asks the DevPayr authority whether the license is paid for that identity
//! - Decrypts and applies injectables released with a successful check
//! - Routes failures to a log line, a notice, a redirect, or nothing
//!
//! # Failure policy
//!
//! A missing license key is the only error returned to the host.
//! Authorization and transport failures are routed, and cache or
//! fingerprint write failures are absorbed.

mod authority;
mod bootstrap;
mod cache;
mod clock;
mod config;
mod environment;
mod error;
mod failure;
mod fingerprint;
mod hostname;
mod identity;
mod injectable;
mod persist;
mod validator;

#[cfg(feature = "online")]
pub use authority::HttpAuthority;
pub use authority::{
    AuthorityError, AuthorityResult, CheckRequest, LicenseAuthority, ValidationOutcome,
};
#[cfg(feature = "online")]
pub use bootstrap::bootstrap;
pub use bootstrap::{Bootstrap, BootstrapOutcome};
pub use cache::{resolve_cache_dir, CacheKey, ValidationCache, CACHE_KEY_PREFIX, DEFAULT_CACHE_DIR};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    RuntimeConfig, DEFAULT_ACTION, DEFAULT_BASE_URL, DEFAULT_REDIRECT_URL, DEFAULT_TIMEOUT_MS,
};
pub use environment::{infer_domain, EnvCandidate, EnvSource, ProcessEnv, ENV_CANDIDATES};
pub use error::{RuntimeError, RuntimeResult};
pub use failure::{
    FailureOutcome, FailureRouter, HeadlessSurface, HostSurface, InvalidBehavior,
    DEFAULT_NOTICE_TEMPLATE, MESSAGE_PLACEHOLDER,
};
pub use fingerprint::{is_fingerprint, FingerprintStore, FINGERPRINT_DIR, FINGERPRINT_FILE};
pub use hostname::{is_ip_address, is_valid_hostname, normalize, normalize_hostname};
pub use identity::{Identity, IdentityResolver, IdentitySource};
pub use injectable::{
    DefaultDispatcher, DispatchReport, FailedInjectable, InjectMode, InjectableError,
    InjectableOptions, InjectablePayload, InjectableProcessor, InjectableResult,
};
pub use persist::Persisted;
pub use validator::{
    DispatchStatus, RuntimeValidator, ValidationReport, CACHED_MESSAGE, UNAUTHORIZED_MESSAGE,
};
