use chrono::NaiveDate;
use devpayr_runtime::{CacheKey, FixedClock, Identity, ValidationCache};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn day(d: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock(NaiveDate::from_ymd_opt(2026, 3, d).unwrap()))
}

fn domain(host: &str) -> Identity {
    Identity::Domain(host.to_string())
}

#[test]
fn key_is_deterministic() {
    let a = CacheKey::derive("L", &domain("domain-a.test"));
    let b = CacheKey::derive("L", &domain("domain-a.test"));
    assert_eq!(a, b);
}

#[test]
fn key_differs_per_identity_and_license() {
    let base = CacheKey::derive("L", &domain("domain-a.test"));
    assert_ne!(base, CacheKey::derive("L", &domain("domain-b.test")));
    assert_ne!(base, CacheKey::derive("M", &domain("domain-a.test")));
}

#[test]
fn empty_cache_is_stale() {
    let dir = TempDir::new().unwrap();
    let cache = ValidationCache::with_clock(
        dir.path(),
        CacheKey::derive("L", &domain("a.test")),
        day(1),
    );
    assert!(!cache.is_fresh());
}

#[test]
fn success_recorded_today_is_fresh() {
    let dir = TempDir::new().unwrap();
    let cache = ValidationCache::with_clock(
        dir.path().join("nested"),
        CacheKey::derive("L", &domain("a.test")),
        day(1),
    );

    assert!(cache.record_success().is_stored());
    assert!(cache.is_fresh());
    assert_eq!(fs::read_to_string(cache.file_path()).unwrap(), "2026-03-01");
}

#[test]
fn entry_expires_at_date_rollover() {
    let dir = TempDir::new().unwrap();
    let key = CacheKey::derive("L", &domain("a.test"));

    let today = ValidationCache::with_clock(dir.path(), key.clone(), day(1));
    assert!(today.record_success().is_stored());

    let tomorrow = ValidationCache::with_clock(dir.path(), key, day(2));
    assert!(!tomorrow.is_fresh());
}

#[test]
fn entries_are_independent_per_key() {
    let dir = TempDir::new().unwrap();
    let a = ValidationCache::with_clock(dir.path(), CacheKey::derive("L", &domain("a.test")), day(1));
    let b = ValidationCache::with_clock(dir.path(), CacheKey::derive("L", &domain("b.test")), day(1));

    assert!(a.record_success().is_stored());
    assert!(a.is_fresh());
    assert!(!b.is_fresh());

    assert!(b.record_success().is_stored());
    assert!(a.is_fresh());
}

#[test]
fn partial_or_garbage_content_is_a_miss() {
    let dir = TempDir::new().unwrap();
    let cache = ValidationCache::with_clock(dir.path(), CacheKey::derive("L", &domain("a.test")), day(1));

    for content in ["2026-03", "", "garbage", "2026-03-01-extra"] {
        fs::write(cache.file_path(), content).unwrap();
        assert!(!cache.is_fresh(), "{content:?} should be a miss");
    }
}

#[test]
fn unwritable_cache_dir_is_non_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file").unwrap();

    let cache = ValidationCache::with_clock(&blocker, CacheKey::derive("L", &domain("a.test")), day(1));
    assert!(!cache.record_success().is_stored());
    assert!(!cache.is_fresh());
}

#[test]
fn file_named_after_key() {
    let dir = TempDir::new().unwrap();
    let key = CacheKey::derive("L", &domain("a.test"));
    let cache = ValidationCache::with_clock(dir.path(), key.clone(), day(1));
    assert_eq!(cache.file_path(), dir.path().join(format!("{key}.txt")));
}
