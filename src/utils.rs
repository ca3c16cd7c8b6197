use rand::{Rng, distr::Alphanumeric};

/// Joins the OAuth callback path onto a base URL, tolerating a trailing
/// slash on the base.
pub fn callback_url(base_url: &str) -> String {
    format!("{}/callback", base_url.trim_end_matches('/'))
}

/// Generates a short lowercase alphanumeric suffix for overlay node
/// hostnames, keeping generated names collision-resistant when several
/// nodes join with the default hint.
pub fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Strips the trailing dot a DNS status interface may leave on a fully
/// qualified name (`node-1.example.ts.net.`).
pub fn trim_fqdn(name: &str) -> &str {
    name.trim_end_matches('.')
}
