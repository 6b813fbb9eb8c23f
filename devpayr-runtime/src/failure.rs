//! What happens when a deployment is not licensed.
//!
//! The router never fails: every path ends in a logged line, a rendered
//! or printed notice, a redirect, or nothing at all.

use crate::config::RuntimeConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// The notice bundled with the crate. Contains a `{{message}}` placeholder.
pub const DEFAULT_NOTICE_TEMPLATE: &str = include_str!("../resources/views/unlicensed.html");

/// Placeholder replaced by the failure message.
pub const MESSAGE_PLACEHOLDER: &str = "{{message}}";

/// Observable behavior on validation failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidBehavior {
    /// Log the message and continue.
    Log,
    /// Navigate to an upgrade page when the host can navigate.
    Redirect,
    /// Do nothing.
    Silent,
    /// Show a notice built from a template. Unrecognized values land here.
    #[default]
    #[serde(other)]
    Modal,
}

/// Capabilities of the host's presentation layer.
///
/// Hosts with a browser-like surface override `navigate` and
/// `render_notice`; headless hosts only print.
pub trait HostSurface: Send + Sync {
    /// Navigates to `url`. Returns false if navigation is unavailable.
    fn navigate(&self, _url: &str) -> bool {
        false
    }

    /// Mounts an HTML notice. Returns false if there is nowhere to mount it.
    fn render_notice(&self, _html: &str) -> bool {
        false
    }

    /// Prints text where the user will see it.
    fn print(&self, text: &str) {
        println!("{text}");
    }
}

/// A host without navigation or DOM; notices go to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessSurface;

impl HostSurface for HeadlessSurface {}

/// Which behavior actually happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Message went to the error log.
    Logged,
    /// Nothing observable happened.
    Silenced,
    /// The host navigated to `target`.
    Redirected { target: String },
    /// Navigation was unavailable; target and message were logged.
    RedirectUnavailable { target: String },
    /// The notice was mounted by the host.
    Rendered,
    /// The notice HTML was printed.
    Printed,
    /// The template could not be read; the bare message was printed.
    FallbackPrinted,
}

/// Routes a failure message to the configured behavior.
#[derive(Clone)]
pub struct FailureRouter<'a> {
    config: &'a RuntimeConfig,
    surface: Arc<dyn HostSurface>,
}

impl<'a> FailureRouter<'a> {
    /// A router for `config`, presenting through `surface`.
    pub fn new(config: &'a RuntimeConfig, surface: Arc<dyn HostSurface>) -> Self {
        Self { config, surface }
    }

    /// A router for a headless host.
    pub fn headless(config: &'a RuntimeConfig) -> Self {
        Self::new(config, Arc::new(HeadlessSurface))
    }

    /// Handles a failure. `message` is replaced by `customInvalidMessage`
    /// when one is configured.
    pub fn route(&self, message: &str) -> FailureOutcome {
        let message = self
            .config
            .custom_invalid_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(message);

        match self.config.invalid_behavior {
            InvalidBehavior::Log => {
                error!("[DevPayr] License validation failed: {message}");
                FailureOutcome::Logged
            }
            InvalidBehavior::Silent => FailureOutcome::Silenced,
            InvalidBehavior::Redirect => self.redirect(message),
            InvalidBehavior::Modal => self.show_notice(message),
        }
    }

    fn redirect(&self, message: &str) -> FailureOutcome {
        let target = self.config.redirect_target().to_string();
        if self.surface.navigate(&target) {
            return FailureOutcome::Redirected { target };
        }
        error!("[DevPayr] Redirect failed. Not running in a browser context.");
        error!("[DevPayr] Redirect target: {target}");
        error!("[DevPayr] Message: {message}");
        FailureOutcome::RedirectUnavailable { target }
    }

    fn show_notice(&self, message: &str) -> FailureOutcome {
        match self.load_template() {
            Ok(template) => {
                let html = template.replacen(MESSAGE_PLACEHOLDER, message, 1);
                if self.surface.render_notice(&html) {
                    FailureOutcome::Rendered
                } else {
                    self.surface.print(&html);
                    FailureOutcome::Printed
                }
            }
            Err(e) => {
                error!(error = %e, "Cannot read license notice template");
                self.surface
                    .print(&format!("\u{26a0}\u{fe0f} Unlicensed Software\n\n{message}"));
                FailureOutcome::FallbackPrinted
            }
        }
    }

    fn load_template(&self) -> std::io::Result<String> {
        match self.config.custom_invalid_view.as_deref() {
            Some(path) => std::fs::read_to_string(path),
            None => Ok(DEFAULT_NOTICE_TEMPLATE.to_string()),
        }
    }
}
