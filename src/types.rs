use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
    /// Redirect URI the token was issued against. A drifted callback URL
    /// makes this stale and forces a re-authorization.
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureStrategy {
    LocalOnly,
    ReverseTunnel,
    OverlayNetwork,
    SelfSignedTls,
    ManagedTls,
}

impl std::fmt::Display for ExposureStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExposureStrategy::LocalOnly => "local-only",
            ExposureStrategy::ReverseTunnel => "reverse-tunnel",
            ExposureStrategy::OverlayNetwork => "overlay-network",
            ExposureStrategy::SelfSignedTls => "self-signed-tls",
            ExposureStrategy::ManagedTls => "managed-tls",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one exposure resolution pass. Produced fresh on every attempt
/// and swapped in whole; never mutated in place.
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub strategy: ExposureStrategy,
    pub base_url: String,
    pub terminates_tls_locally: bool,
    pub resolved_at: u64,
    /// Certificate pair to serve when TLS is terminated locally.
    pub tls_files: Option<CertPair>,
}

impl ResolvedEndpoint {
    pub fn callback_url(&self) -> String {
        crate::utils::callback_url(&self.base_url)
    }
}

#[derive(Debug, Clone)]
pub struct CertPair {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftStatus {
    pub changed: bool,
    pub previous: Option<String>,
}

// Wire shape of the ngrok agent's local status API (`/api/tunnels`).

#[derive(Debug, Clone, Deserialize)]
pub struct TunnelsResponse {
    pub tunnels: Vec<Tunnel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tunnel {
    pub proto: String,
    pub public_url: String,
}

// Wire shape of `tailscale status --json`, reduced to the fields the
// discovery path reads.

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayStatus {
    #[serde(rename = "Self")]
    pub self_peer: Option<OverlayPeer>,
    #[serde(rename = "Peer", default)]
    pub peers: HashMap<String, OverlayPeer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverlayPeer {
    #[serde(rename = "IsSelf", default)]
    pub is_self: bool,
    #[serde(rename = "DNSName", default)]
    pub dns_name: String,
}

// Reduced playback state returned by `GET /me/player`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<TrackItem>,
    pub device: Option<Device>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub name: String,
    pub duration_ms: u64,
    pub artists: Vec<TrackArtist>,
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub volume_percent: Option<u8>,
}
