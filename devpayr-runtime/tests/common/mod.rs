//! Shared test helpers for runtime tests.

#![allow(dead_code)]

use async_trait::async_trait;
use devpayr_crypto::{encrypt_string, sign_hex, SharedKey};
use devpayr_runtime::{
    AuthorityError, AuthorityResult, CheckRequest, HostSurface, InjectMode, InjectablePayload,
    LicenseAuthority, RuntimeConfig, ValidationOutcome,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What a [`StubAuthority`] answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Outcome(ValidationOutcome),
    Fail(String),
}

/// In-memory authority that records every call.
#[derive(Debug)]
pub struct StubAuthority {
    reply: Reply,
    calls: AtomicUsize,
    identities: Mutex<Vec<String>>,
    include_flags: Mutex<Vec<bool>>,
}

impl StubAuthority {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            identities: Mutex::new(Vec::new()),
            include_flags: Mutex::new(Vec::new()),
        }
    }

    pub fn authorized() -> Self {
        Self::new(Reply::Outcome(ValidationOutcome::authorized(Vec::new())))
    }

    pub fn authorized_with(injectables: Vec<InjectablePayload>) -> Self {
        Self::new(Reply::Outcome(ValidationOutcome::authorized(injectables)))
    }

    pub fn unauthorized() -> Self {
        Self::new(Reply::Outcome(ValidationOutcome::unauthorized()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::new(Reply::Fail(reason.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn identities(&self) -> Vec<String> {
        self.identities.lock().unwrap().clone()
    }

    pub fn include_flags(&self) -> Vec<bool> {
        self.include_flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl LicenseAuthority for StubAuthority {
    async fn check(&self, request: &CheckRequest<'_>) -> AuthorityResult<ValidationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identities
            .lock()
            .unwrap()
            .push(request.identity.as_str().to_string());
        self.include_flags
            .lock()
            .unwrap()
            .push(request.include_injectables);
        match &self.reply {
            Reply::Outcome(outcome) => Ok(outcome.clone()),
            Reply::Fail(reason) => Err(AuthorityError::Request {
                endpoint: "stub".into(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Host surface that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub can_navigate: bool,
    pub can_render: bool,
    pub navigations: Mutex<Vec<String>>,
    pub rendered: Mutex<Vec<String>>,
    pub printed: Mutex<Vec<String>>,
}

impl RecordingSurface {
    pub fn headless() -> Self {
        Self::default()
    }

    pub fn browser() -> Self {
        Self {
            can_navigate: true,
            can_render: true,
            ..Self::default()
        }
    }

    pub fn printed(&self) -> Vec<String> {
        self.printed.lock().unwrap().clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.rendered.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl HostSurface for RecordingSurface {
    fn navigate(&self, url: &str) -> bool {
        if self.can_navigate {
            self.navigations.lock().unwrap().push(url.to_string());
        }
        self.can_navigate
    }

    fn render_notice(&self, html: &str) -> bool {
        if self.can_render {
            self.rendered.lock().unwrap().push(html.to_string());
        }
        self.can_render
    }

    fn print(&self, text: &str) {
        self.printed.lock().unwrap().push(text.to_string());
    }
}

/// Installs a test-writer subscriber honoring `RUST_LOG`. Safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Environment map from `(name, value)` pairs.
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// A payload sealed and signed the way the authority delivers it.
pub fn sealed_payload(secret: &str, slug: &str, plaintext: &str) -> InjectablePayload {
    let key = SharedKey::from_secret(secret).unwrap();
    let encrypted_content = encrypt_string(&key, plaintext).unwrap();
    let signature = sign_hex(secret.as_bytes(), encrypted_content.as_bytes()).unwrap();
    InjectablePayload {
        slug: slug.to_string(),
        name: Some(slug.to_string()),
        encrypted_content,
        signature: Some(signature),
        target_path: None,
        mode: InjectMode::Replace,
    }
}

/// A license-mode configuration caching under `cache_dir`.
pub fn config_in(cache_dir: &Path, license: &str) -> RuntimeConfig {
    RuntimeConfig {
        cache_path: Some(cache_dir.to_path_buf()),
        ..RuntimeConfig::with_license(license)
    }
}
