use std::{
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
};

use rcgen::{CertificateParams, DistinguishedName, DnType, Ia5String, KeyPair, SanType};

use crate::info;

pub const SELF_SIGNED_CERT_FILE: &str = "selfsigned-cert.pem";
pub const SELF_SIGNED_KEY_FILE: &str = "selfsigned-key.pem";

/// File names an externally managed pair (e.g. copied out of a certbot
/// live directory) is expected under.
pub const MANAGED_CERT_FILE: &str = "cert.pem";
pub const MANAGED_KEY_FILE: &str = "key.pem";

pub const DEFAULT_VALIDITY_DAYS: u32 = 365;

/// Returns the externally managed certificate pair if both files exist at
/// the configured path. No generation, no chain validation; renewal is the
/// operator's tooling's job.
pub fn ensure_managed(dir: &Path) -> Option<(PathBuf, PathBuf)> {
    let cert = dir.join(MANAGED_CERT_FILE);
    let key = dir.join(MANAGED_KEY_FILE);
    (cert.is_file() && key.is_file()).then_some((cert, key))
}

/// Returns a self-signed certificate pair for `identity`, generating one on
/// first use.
///
/// Idempotent: an existing pair is returned unchanged, even when expired.
/// Regeneration is an explicit operator action (delete the pair and run
/// again). The generated certificate is its own issuer and carries the
/// identity, `localhost` and the loopback address as subject alternative
/// names so browsers on the box itself can also reach the server.
pub async fn ensure_self_signed(
    dir: &Path,
    identity: &str,
    validity_days: u32,
) -> Result<(PathBuf, PathBuf), String> {
    let cert_path = dir.join(SELF_SIGNED_CERT_FILE);
    let key_path = dir.join(SELF_SIGNED_KEY_FILE);
    if cert_path.is_file() && key_path.is_file() {
        return Ok((cert_path, key_path));
    }

    info!("Generating self-signed certificate for {}...", identity);

    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, identity);
    params.distinguished_name = dn;

    params.subject_alt_names = vec![
        SanType::DnsName(Ia5String::try_from(identity).map_err(|e| e.to_string())?),
        SanType::IpAddress(IpAddr::V4(Ipv4Addr::LOCALHOST)),
    ];
    if identity != "localhost" {
        params.subject_alt_names.push(SanType::DnsName(
            Ia5String::try_from("localhost").map_err(|e| e.to_string())?,
        ));
    }

    let not_before = time::OffsetDateTime::now_utc();
    params.not_before = not_before;
    params.not_after = not_before + time::Duration::days(validity_days as i64);

    let key_pair = KeyPair::generate().map_err(|e| e.to_string())?;
    let cert = params
        .self_signed(&key_pair)
        .map_err(|e| e.to_string())?;

    async_fs::create_dir_all(dir).await.map_err(|e| e.to_string())?;
    async_fs::write(&cert_path, cert.pem())
        .await
        .map_err(|e| e.to_string())?;
    async_fs::write(&key_path, key_pair.serialize_pem())
        .await
        .map_err(|e| e.to_string())?;

    Ok((cert_path, key_path))
}
