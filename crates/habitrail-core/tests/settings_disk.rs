//! Settings persistence against a real directory.
//!
//! The data directory override is process-wide, so the whole flow
//! lives in one test.

use habitrail_core::Settings;
use tempfile::TempDir;

#[test]
fn test_settings_survive_a_disk_round_trip() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("HABITRAIL_DATA_DIR", dir.path());

    // First load finds no file and writes the defaults out.
    let settings = Settings::load().unwrap();
    assert!(settings.analytics.cache_enabled);
    assert!(dir.path().join("config.toml").exists());

    // set() persists, so a fresh load sees the new value.
    let mut settings = settings;
    settings.set("analytics.cache_ttl_minutes", "10").unwrap();
    let reloaded = Settings::load().unwrap();
    assert_eq!(reloaded.analytics.cache_ttl_minutes, 10);
    assert_eq!(
        reloaded.get("analytics.cache_ttl_minutes").as_deref(),
        Some("10")
    );

    // A garbled file is a load error; load_or_default falls back.
    std::fs::write(dir.path().join("config.toml"), "not toml [").unwrap();
    assert!(Settings::load().is_err());
    let fallback = Settings::load_or_default();
    assert!(fallback.analytics.cache_enabled);

    std::env::remove_var("HABITRAIL_DATA_DIR");
}
