use std::path::PathBuf;

use sporemote::exposure::certs;
use sporemote::utils;

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sporemote-test-{}-{}-{}",
        tag,
        std::process::id(),
        utils::random_suffix(8)
    ))
}

#[tokio::test]
async fn test_self_signed_generates_pem_pair() {
    let dir = temp_dir("selfsigned-gen");

    let (cert_path, key_path) = certs::ensure_self_signed(&dir, "localhost", 365)
        .await
        .unwrap();

    assert!(cert_path.is_file());
    assert!(key_path.is_file());

    let cert_pem = std::fs::read_to_string(&cert_path).unwrap();
    let key_pem = std::fs::read_to_string(&key_path).unwrap();
    assert!(cert_pem.contains("BEGIN CERTIFICATE"));
    assert!(key_pem.contains("BEGIN PRIVATE KEY"));
}

#[tokio::test]
async fn test_self_signed_is_idempotent() {
    let dir = temp_dir("selfsigned-idem");

    let (first_cert, first_key) = certs::ensure_self_signed(&dir, "remote.example.com", 365)
        .await
        .unwrap();
    let cert_fingerprint = std::fs::read(&first_cert).unwrap();
    let key_fingerprint = std::fs::read(&first_key).unwrap();

    let (second_cert, second_key) = certs::ensure_self_signed(&dir, "remote.example.com", 365)
        .await
        .unwrap();

    // Identical paths, file contents untouched
    assert_eq!(first_cert, second_cert);
    assert_eq!(first_key, second_key);
    assert_eq!(std::fs::read(&second_cert).unwrap(), cert_fingerprint);
    assert_eq!(std::fs::read(&second_key).unwrap(), key_fingerprint);
}

#[tokio::test]
async fn test_managed_requires_both_files() {
    let dir = temp_dir("managed");
    std::fs::create_dir_all(&dir).unwrap();

    assert!(certs::ensure_managed(&dir).is_none());

    std::fs::write(dir.join(certs::MANAGED_CERT_FILE), "cert").unwrap();
    assert!(certs::ensure_managed(&dir).is_none());

    std::fs::write(dir.join(certs::MANAGED_KEY_FILE), "key").unwrap();
    let (cert, key) = certs::ensure_managed(&dir).unwrap();
    assert_eq!(cert, dir.join(certs::MANAGED_CERT_FILE));
    assert_eq!(key, dir.join(certs::MANAGED_KEY_FILE));
}
