//! Runtime configuration.
//!
//! One `RuntimeConfig` is built per bootstrap and passed by reference to
//! every collaborator. Field names on the wire match the options the
//! DevPayr SDKs accept (`handleInjectables`, `invalidBehavior`, ...).

use crate::error::{RuntimeError, RuntimeResult};
use crate::failure::InvalidBehavior;
use crate::injectable::{InjectableOptions, InjectableProcessor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default DevPayr API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.devpayr.dev/api/v1/";

/// Default redirect target for the `redirect` failure behavior.
pub const DEFAULT_REDIRECT_URL: &str = "https://devpayr.com/upgrade";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default validation source identifier.
pub const DEFAULT_ACTION: &str = "check_project";

/// Options consumed by the runtime validator, identity resolver and
/// failure router.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// License key. Required.
    pub license: Option<String>,
    /// Identity seed: a domain or URL. Inferred when absent.
    pub domain: Option<String>,
    /// Always call the authority. When false a same-day cache entry skips it.
    pub recheck: bool,
    /// Shared secret for injectable decryption.
    pub secret: Option<String>,
    /// Ask the authority for injectables.
    pub injectables: bool,
    /// Apply injectables automatically after a successful check.
    pub handle_injectables: bool,
    /// Verify injectable signatures before applying.
    pub injectables_verify: bool,
    /// Destination for applied injectables. Defaults to the temp directory.
    pub injectables_path: Option<PathBuf>,
    /// Replaces the default injectable dispatcher.
    #[serde(skip)]
    pub injectables_processor: Option<Arc<dyn InjectableProcessor>>,
    /// What to do when validation fails.
    pub invalid_behavior: InvalidBehavior,
    /// Target of the `redirect` behavior.
    pub redirect_url: Option<String>,
    /// Replaces the failure message shown to users.
    pub custom_invalid_message: Option<String>,
    /// Template used by the `modal` behavior instead of the bundled one.
    pub custom_invalid_view: Option<PathBuf>,
    /// Directory for cache entries. Defaults to `./.devpayr-cache`.
    pub cache_path: Option<PathBuf>,
    /// Base URL of the DevPayr API.
    #[serde(rename = "base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    /// Identifier of the validation source.
    pub action: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            license: None,
            domain: None,
            recheck: true,
            secret: None,
            injectables: true,
            handle_injectables: false,
            injectables_verify: true,
            injectables_path: None,
            injectables_processor: None,
            invalid_behavior: InvalidBehavior::default(),
            redirect_url: None,
            custom_invalid_message: None,
            custom_invalid_view: None,
            cache_path: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            action: DEFAULT_ACTION.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// A default configuration with `license` set.
    pub fn with_license(license: impl Into<String>) -> Self {
        Self {
            license: Some(license.into()),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration. Missing keys take their defaults and
    /// unknown keys are ignored.
    pub fn from_json_str(json: &str) -> RuntimeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RuntimeError::Configuration(format!("invalid configuration JSON: {e}")))
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Attaches a custom injectable processor.
    #[must_use]
    pub fn with_processor(mut self, processor: Arc<dyn InjectableProcessor>) -> Self {
        self.injectables_processor = Some(processor);
        self
    }

    /// The trimmed license key.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Configuration`] if the license is missing or blank.
    pub fn license_key(&self) -> RuntimeResult<&str> {
        self.license
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| {
                RuntimeError::Configuration(
                    "license key is required for runtime validation".into(),
                )
            })
    }

    /// Redirect target for the `redirect` behavior.
    #[must_use]
    pub fn redirect_target(&self) -> &str {
        self.redirect_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_REDIRECT_URL)
    }

    /// Options handed to the injectable processor.
    #[must_use]
    pub fn injectable_options(&self) -> InjectableOptions {
        InjectableOptions {
            secret: self.secret.clone(),
            path: self
                .injectables_path
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            verify: self.injectables_verify,
        }
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("RuntimeConfig")
            .field("license", &redact(&self.license))
            .field("domain", &self.domain)
            .field("recheck", &self.recheck)
            .field("secret", &redact(&self.secret))
            .field("injectables", &self.injectables)
            .field("handle_injectables", &self.handle_injectables)
            .field("injectables_verify", &self.injectables_verify)
            .field("injectables_path", &self.injectables_path)
            .field(
                "injectables_processor",
                &self.injectables_processor.as_ref().map(|_| "custom"),
            )
            .field("invalid_behavior", &self.invalid_behavior)
            .field("redirect_url", &self.redirect_url)
            .field("custom_invalid_message", &self.custom_invalid_message)
            .field("custom_invalid_view", &self.custom_invalid_view)
            .field("cache_path", &self.cache_path)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("action", &self.action)
            .finish()
    }
}
