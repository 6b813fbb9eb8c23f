mod common;

use common::RecordingSurface;
use devpayr_runtime::{
    FailureOutcome, FailureRouter, InvalidBehavior, RuntimeConfig, DEFAULT_NOTICE_TEMPLATE,
    MESSAGE_PLACEHOLDER,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

fn config(behavior: InvalidBehavior) -> RuntimeConfig {
    RuntimeConfig {
        invalid_behavior: behavior,
        ..RuntimeConfig::with_license("L")
    }
}

fn route(config: &RuntimeConfig, surface: &Arc<RecordingSurface>, message: &str) -> FailureOutcome {
    FailureRouter::new(config, surface.clone()).route(message)
}

// ── Log and silent ──────────────────────────────────────────────

#[test]
fn log_behavior_presents_nothing() {
    let surface = Arc::new(RecordingSurface::browser());
    let outcome = route(&config(InvalidBehavior::Log), &surface, "unpaid");

    assert_eq!(outcome, FailureOutcome::Logged);
    assert!(surface.printed().is_empty());
    assert!(surface.rendered().is_empty());
    assert!(surface.navigations().is_empty());
}

#[test]
fn silent_behavior_does_nothing() {
    let surface = Arc::new(RecordingSurface::browser());
    let outcome = route(&config(InvalidBehavior::Silent), &surface, "unpaid");

    assert_eq!(outcome, FailureOutcome::Silenced);
    assert!(surface.printed().is_empty());
    assert!(surface.rendered().is_empty());
}

// ── Redirect ────────────────────────────────────────────────────

#[test]
fn redirect_navigates_to_default_target() {
    let surface = Arc::new(RecordingSurface::browser());
    let outcome = route(&config(InvalidBehavior::Redirect), &surface, "unpaid");

    assert_eq!(
        outcome,
        FailureOutcome::Redirected {
            target: "https://devpayr.com/upgrade".into()
        }
    );
    assert_eq!(surface.navigations(), vec!["https://devpayr.com/upgrade"]);
}

#[test]
fn redirect_uses_configured_target() {
    let surface = Arc::new(RecordingSurface::browser());
    let config = RuntimeConfig {
        redirect_url: Some("https://billing.example.com/renew".into()),
        ..config(InvalidBehavior::Redirect)
    };
    route(&config, &surface, "unpaid");
    assert_eq!(surface.navigations(), vec!["https://billing.example.com/renew"]);
}

#[test]
fn redirect_without_navigation_only_logs() {
    let surface = Arc::new(RecordingSurface::headless());
    let outcome = route(&config(InvalidBehavior::Redirect), &surface, "unpaid");

    assert_eq!(
        outcome,
        FailureOutcome::RedirectUnavailable {
            target: "https://devpayr.com/upgrade".into()
        }
    );
    assert!(surface.printed().is_empty());
}

// ── Modal ───────────────────────────────────────────────────────

#[test]
fn modal_is_the_default_behavior() {
    assert_eq!(RuntimeConfig::default().invalid_behavior, InvalidBehavior::Modal);
}

#[test]
fn bundled_template_has_a_placeholder() {
    assert!(DEFAULT_NOTICE_TEMPLATE.contains(MESSAGE_PLACEHOLDER));
}

#[test]
fn modal_prints_bundled_template_when_headless() {
    let surface = Arc::new(RecordingSurface::headless());
    let outcome = route(&config(InvalidBehavior::Modal), &surface, "Project is unpaid");

    assert_eq!(outcome, FailureOutcome::Printed);
    let printed = surface.printed();
    assert_eq!(printed.len(), 1);
    assert!(printed[0].contains("Project is unpaid"));
    assert!(!printed[0].contains(MESSAGE_PLACEHOLDER));
}

#[test]
fn modal_renders_when_host_can_mount() {
    let surface = Arc::new(RecordingSurface::browser());
    let outcome = route(&config(InvalidBehavior::Modal), &surface, "nope");

    assert_eq!(outcome, FailureOutcome::Rendered);
    assert!(surface.rendered()[0].contains("nope"));
    assert!(surface.printed().is_empty());
}

#[test]
fn custom_message_replaces_raw_message() {
    let surface = Arc::new(RecordingSurface::headless());
    let config = RuntimeConfig {
        custom_invalid_message: Some("Please renew your plan".into()),
        ..config(InvalidBehavior::Modal)
    };
    route(&config, &surface, "raw failure");

    let printed = surface.printed();
    assert!(printed[0].contains("Please renew your plan"));
    assert!(!printed[0].contains("raw failure"));
}

#[test]
fn blank_custom_message_is_ignored() {
    let surface = Arc::new(RecordingSurface::headless());
    let config = RuntimeConfig {
        custom_invalid_message: Some("  ".into()),
        ..config(InvalidBehavior::Modal)
    };
    route(&config, &surface, "raw failure");
    assert!(surface.printed()[0].contains("raw failure"));
}

#[test]
fn custom_view_replaces_first_placeholder_only() {
    let dir = TempDir::new().unwrap();
    let view = dir.path().join("notice.html");
    std::fs::write(&view, "<h1>{{message}}</h1><p>{{message}}</p>").unwrap();

    let surface = Arc::new(RecordingSurface::headless());
    let config = RuntimeConfig {
        custom_invalid_view: Some(view),
        ..config(InvalidBehavior::Modal)
    };
    route(&config, &surface, "expired");

    assert_eq!(surface.printed(), vec!["<h1>expired</h1><p>{{message}}</p>"]);
}

#[test]
fn unreadable_custom_view_falls_back_to_plain_text() {
    let dir = TempDir::new().unwrap();
    let surface = Arc::new(RecordingSurface::browser());
    let config = RuntimeConfig {
        custom_invalid_view: Some(dir.path().join("missing.html")),
        ..config(InvalidBehavior::Modal)
    };
    let outcome = route(&config, &surface, "expired");

    assert_eq!(outcome, FailureOutcome::FallbackPrinted);
    assert_eq!(
        surface.printed(),
        vec!["\u{26a0}\u{fe0f} Unlicensed Software\n\nexpired"]
    );
    assert!(surface.rendered().is_empty());
}

#[test]
fn behavior_parses_lowercase() {
    let b: InvalidBehavior = serde_json::from_str("\"redirect\"").unwrap();
    assert_eq!(b, InvalidBehavior::Redirect);
}
