use sporemote::utils::*;

#[test]
fn test_callback_url() {
    assert_eq!(
        callback_url("http://localhost:5000"),
        "http://localhost:5000/callback"
    );

    // Trailing slash on the base is tolerated
    assert_eq!(
        callback_url("https://node-1.example.ts.net:5000/"),
        "https://node-1.example.ts.net:5000/callback"
    );
}

#[test]
fn test_random_suffix() {
    let suffix = random_suffix(4);

    // Should be exactly the requested length
    assert_eq!(suffix.len(), 4);

    // Should contain only lowercase alphanumeric characters
    assert!(
        suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase())
    );

    // Two generated suffixes should (very likely) differ
    let other = random_suffix(16);
    assert_ne!(random_suffix(16), other);
}

#[test]
fn test_trim_fqdn() {
    assert_eq!(trim_fqdn("node-1.example.ts.net."), "node-1.example.ts.net");
    assert_eq!(trim_fqdn("node-1.example.ts.net"), "node-1.example.ts.net");
    assert_eq!(trim_fqdn(""), "");
}
