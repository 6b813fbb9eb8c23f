//! HTTPS client for the DevPayr API.

use super::{AuthorityError, AuthorityResult, CheckRequest, LicenseAuthority, ValidationOutcome};
use crate::config::RuntimeConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Path of the payment check, relative to the API base URL.
const CHECK_PATH: &str = "project/has-paid";

/// Header carrying the license key.
const LICENSE_HEADER: &str = "X-LICENSE";

#[derive(Debug, Deserialize)]
struct CheckEnvelope {
    #[serde(default)]
    data: Option<ValidationOutcome>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// [`LicenseAuthority`] backed by the DevPayr HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: Client,
    base_url: String,
}

impl HttpAuthority {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AuthorityResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthorityError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into().trim().to_string();
        if base_url.is_empty() {
            return Err(AuthorityError::Config("base_url must not be empty".into()));
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    /// Creates a client from the runtime configuration.
    pub fn from_config(config: &RuntimeConfig) -> AuthorityResult<Self> {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    fn endpoint(&self) -> String {
        format!("{}{CHECK_PATH}", self.base_url)
    }
}

#[async_trait]
impl LicenseAuthority for HttpAuthority {
    async fn check(&self, request: &CheckRequest<'_>) -> AuthorityResult<ValidationOutcome> {
        let endpoint = self.endpoint();
        debug!(endpoint = %endpoint, identity = %request.identity, "Checking license with authority");

        let mut builder = self
            .client
            .post(&endpoint)
            .header(LICENSE_HEADER, request.license)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "domain": request.identity.as_str(),
                "action": request.action,
            }));
        if request.include_injectables {
            builder = builder.query(&[("include", "injectables")]);
        }

        let response = builder.send().await.map_err(|e| AuthorityError::Request {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AuthorityError::Request {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(AuthorityError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        let envelope: CheckEnvelope =
            serde_json::from_str(&body).map_err(|e| AuthorityError::Decode {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(envelope.data.unwrap_or_default())
    }
}
