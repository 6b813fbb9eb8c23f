//! Deployment identity inference from the process environment.
//!
//! Candidates are consulted in a fixed order, most intentional first:
//! explicit DevPayr/app domain variables, generic "app URL" variables,
//! hosting-platform variables, and finally generic host variables.

use crate::hostname::normalize_hostname;
use std::collections::HashMap;

/// Read access to environment variables.
pub trait EnvSource {
    /// Returns the variable's value, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// One named lookup in the inference chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvCandidate {
    /// The variable's value is used as-is.
    Var(&'static str),
    /// The variable holds a Fly.io app name; the host is `<name>.fly.dev`.
    FlyApp(&'static str),
}

impl EnvCandidate {
    /// The environment variable this candidate reads.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Var(name) | Self::FlyApp(name) => name,
        }
    }

    fn lookup(&self, env: &impl EnvSource) -> Option<String> {
        let value = env.var(self.name()).filter(|v| !v.trim().is_empty())?;
        match self {
            Self::Var(_) => Some(value),
            Self::FlyApp(_) => Some(format!("{}.fly.dev", value.trim())),
        }
    }
}

/// The inference chain, in precedence order.
pub const ENV_CANDIDATES: &[EnvCandidate] = &[
    EnvCandidate::Var("DEVPAYR_DOMAIN"),
    EnvCandidate::Var("APP_DOMAIN"),
    EnvCandidate::Var("APP_URL"),
    EnvCandidate::Var("SITE_URL"),
    EnvCandidate::Var("PUBLIC_URL"),
    EnvCandidate::Var("VERCEL_URL"),
    EnvCandidate::Var("VERCEL_PROJECT_PRODUCTION_URL"),
    EnvCandidate::Var("RENDER_EXTERNAL_URL"),
    EnvCandidate::Var("RAILWAY_STATIC_URL"),
    EnvCandidate::FlyApp("FLY_APP_NAME"),
    EnvCandidate::Var("HOST"),
    EnvCandidate::Var("HOSTNAME"),
];

/// Returns the first candidate that normalizes to a valid hostname.
///
/// Later variables are not read once an earlier one succeeds.
#[must_use]
pub fn infer_domain(env: &impl EnvSource) -> Option<String> {
    ENV_CANDIDATES
        .iter()
        .filter_map(|candidate| candidate.lookup(env))
        .find_map(|value| normalize_hostname(&value))
}
