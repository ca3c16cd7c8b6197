//! Configuration management for the Spotify remote.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials, the
//! server port, and the per-strategy exposure settings (tunnel auth token,
//! overlay auth key, certificate locations).
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Loads environment variables from a `.env` file if one can be found.
///
/// Looks for a `.env` file in the current working directory first (the
/// deployment layout), then falls back to the platform-specific local data
/// directory under `sporemote/.env`. A missing file is not an error: the
/// process may be configured entirely through real environment variables.
///
/// # Directory Structure
///
/// The fallback location is:
/// - Linux: `~/.local/share/sporemote/.env`
/// - macOS: `~/Library/Application Support/sporemote/.env`
/// - Windows: `%LOCALAPPDATA%/sporemote/.env`
///
/// # Errors
///
/// Returns an error only if a file was found but could not be parsed.
pub async fn load_env() -> Result<(), String> {
    let local = PathBuf::from(".env");
    if local.is_file() {
        dotenv::from_path(&local).map_err(|e| e.to_string())?;
        return Ok(());
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporemote/.env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_CLIENT_ID` environment variable which contains
/// the client ID obtained when registering the application with Spotify's
/// developer platform.
///
/// # Panics
///
/// Panics if the `SPOTIFY_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_CLIENT_ID").expect("SPOTIFY_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// Retrieves the `SPOTIFY_CLIENT_SECRET` environment variable. The secret
/// is sent only to Spotify's token endpoint and must never appear in logs
/// or version control.
///
/// # Panics
///
/// Panics if the `SPOTIFY_CLIENT_SECRET` environment variable is not set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_CLIENT_SECRET").expect("SPOTIFY_CLIENT_SECRET must be set")
}

/// Returns the OAuth scope requested during authorization.
///
/// Defaults to the playback-control scopes the remote needs; override via
/// the `SPOTIFY_SCOPE` environment variable.
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_SCOPE").unwrap_or_else(|_| {
        "user-read-playback-state user-modify-playback-state user-read-currently-playing"
            .to_string()
    })
}

/// Returns the Spotify OAuth authorization URL.
///
/// Overridable via `SPOTIFY_AUTH_URL`, which the test suite uses to point
/// the OAuth client at a local stand-in.
pub fn spotify_auth_url() -> String {
    env::var("SPOTIFY_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Overridable via `SPOTIFY_TOKEN_URL`.
pub fn spotify_token_url() -> String {
    env::var("SPOTIFY_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the Spotify Web API base URL.
///
/// Overridable via `SPOTIFY_API_URL`.
pub fn spotify_api_url() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the port the embedded server binds to. Defaults to 5000.
pub fn port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000)
}

/// Returns the configured public domain name, if any.
///
/// Used by the managed-TLS and self-signed strategies to build the base
/// URL and the certificate identity.
pub fn domain_name() -> Option<String> {
    env::var("DOMAIN_NAME").ok().filter(|d| !d.is_empty())
}

/// Whether the ngrok tunnel strategy is enabled. Defaults to true; the
/// strategy additionally requires `NGROK_AUTHTOKEN` to be selected.
pub fn use_ngrok() -> bool {
    env::var("USE_NGROK")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(true)
}

/// Returns the ngrok auth token, if configured.
pub fn ngrok_authtoken() -> Option<String> {
    env::var("NGROK_AUTHTOKEN").ok().filter(|t| !t.is_empty())
}

/// Returns the tailscale auth key, if configured.
pub fn tailscale_authkey() -> Option<String> {
    env::var("TAILSCALE_AUTHKEY").ok().filter(|k| !k.is_empty())
}

/// Whether a self-signed certificate should be generated and served when no
/// higher-priority strategy applies. Defaults to false.
pub fn self_signed_tls() -> bool {
    env::var("SELF_SIGNED_TLS")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Returns the directory holding an externally managed certificate pair
/// (`cert.pem` + `key.pem`). Defaults to `./certs`.
pub fn certs_dir() -> PathBuf {
    env::var("CERTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("certs"))
}

/// Returns the cache directory holding the token cache, the last callback
/// URL, the first-run marker and the self-signed certificate pair.
/// Defaults to `./.cache`.
pub fn cache_dir() -> PathBuf {
    env::var("CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".cache"))
}

/// Whether the setup page should be shown even after the first successful
/// exposure. Defaults to false.
pub fn force_setup() -> bool {
    env::var("FORCE_SETUP")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}
