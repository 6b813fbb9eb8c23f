//! Boundary to the remote licensing authority.

#[cfg(feature = "online")]
mod http;

#[cfg(feature = "online")]
pub use http::HttpAuthority;

use crate::identity::Identity;
use crate::injectable::InjectablePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Result type for authority calls.
pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// Failures talking to the authority. All of them are transport failures
/// from the validator's point of view.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The request could not be built or sent.
    #[error("request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    /// The authority answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// The client could not be configured.
    #[error("invalid authority configuration: {0}")]
    Config(String),
}

/// What the authority said about a license and identity.
///
/// Decoding never fails on the contents of `data`: `has_paid` is read by
/// truthiness and injectables that do not parse are dropped, so a bad
/// asset cannot turn a paid answer into an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ValidationOutcome {
    /// Whether the project is paid/authorized for this identity.
    #[serde(rename = "has_paid")]
    pub authorized: bool,
    /// Encrypted assets released with the authorization, in delivery order.
    pub injectables: Vec<InjectablePayload>,
}

impl From<Value> for ValidationOutcome {
    fn from(data: Value) -> Self {
        let authorized = data.get("has_paid").is_some_and(is_truthy);
        if !authorized {
            return Self::unauthorized();
        }

        let injectables = match data.get("injectables") {
            Some(Value::Array(entries)) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    serde_json::from_value(entry.clone())
                        .map_err(|e| warn!(index, error = %e, "Dropping malformed injectable"))
                        .ok()
                })
                .collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!(found = %other, "Ignoring non-list injectables");
                Vec::new()
            }
        };

        Self::authorized(injectables)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl ValidationOutcome {
    /// An authorized outcome carrying `injectables`.
    #[must_use]
    pub fn authorized(injectables: Vec<InjectablePayload>) -> Self {
        Self {
            authorized: true,
            injectables,
        }
    }

    /// An unauthorized outcome.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::default()
    }
}

/// Per-call options forwarded to the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest<'a> {
    /// The license key.
    pub license: &'a str,
    /// The resolved deployment identity.
    pub identity: &'a Identity,
    /// Identifier of the validation source.
    pub action: &'a str,
    /// Ask the authority to include injectables in the response.
    pub include_injectables: bool,
}

/// The authority's single check operation.
#[async_trait]
pub trait LicenseAuthority: Send + Sync {
    /// Checks whether `request.license` is authorized for `request.identity`.
    async fn check(&self, request: &CheckRequest<'_>) -> AuthorityResult<ValidationOutcome>;
}
