use std::path::PathBuf;

use sporemote::management::RedirectStateStore;
use sporemote::utils;

// Helper to create a unique per-test cache directory
fn temp_cache_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sporemote-test-{}-{}-{}",
        tag,
        std::process::id(),
        utils::random_suffix(8)
    ))
}

#[tokio::test]
async fn test_first_record_reports_no_drift() {
    let store = RedirectStateStore::new(temp_cache_dir("first-record"));

    let status = store
        .record_and_compare("http://localhost:5000/callback")
        .await;

    // Absent on first run: nothing to drift from
    assert!(!status.changed);
    assert_eq!(status.previous, None);
}

#[tokio::test]
async fn test_same_url_reports_unchanged() {
    let store = RedirectStateStore::new(temp_cache_dir("same-url"));
    let url = "https://abc123.ngrok-free.app/callback";

    store.record_and_compare(url).await;
    let status = store.record_and_compare(url).await;

    assert!(!status.changed);
    assert_eq!(status.previous, Some(url.to_string()));
}

#[tokio::test]
async fn test_changed_url_reports_drift_with_previous() {
    let store = RedirectStateStore::new(temp_cache_dir("changed-url"));

    store
        .record_and_compare("http://localhost:5000/callback")
        .await;
    let status = store
        .record_and_compare("https://node-1.example.ts.net:5000/callback")
        .await;

    assert!(status.changed);
    assert_eq!(
        status.previous,
        Some("http://localhost:5000/callback".to_string())
    );

    // The record is monotonic: the new URL replaced the old one
    let status = store
        .record_and_compare("https://node-1.example.ts.net:5000/callback")
        .await;
    assert!(!status.changed);
}

#[tokio::test]
async fn test_comparison_is_case_sensitive() {
    let store = RedirectStateStore::new(temp_cache_dir("case"));

    store
        .record_and_compare("https://Example.com:5000/callback")
        .await;
    let status = store
        .record_and_compare("https://example.com:5000/callback")
        .await;

    assert!(status.changed);
}

#[tokio::test]
async fn test_first_run_marker() {
    let store = RedirectStateStore::new(temp_cache_dir("first-run"));

    assert!(store.is_first_run().await);

    store.mark_first_run_done().await;
    assert!(!store.is_first_run().await);

    // Never cleared automatically
    store.mark_first_run_done().await;
    assert!(!store.is_first_run().await);
}
