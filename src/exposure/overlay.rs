use std::sync::Arc;

use thiserror::Error;

use crate::{info, success, types::OverlayStatus, utils};

use super::process::ProcessPort;

/// Hostname hint used when the operator configured nothing. Joining with
/// the placeholder gets a random suffix so two nodes joining with defaults
/// cannot collide.
pub const DEFAULT_HOSTNAME_HINT: &str = "sporemote";

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("overlay network not connected: {0}")]
    NotConnected(String),

    #[error("failed to join overlay network: {0}")]
    Join(String),
}

/// Drives the tailscale client: a one-time `join` from the setup entry
/// point, and hostname `discover`y on every resolution. The daemon keeps
/// its node hostname across restarts once joined, so the steady-state path
/// never needs to join again.
pub struct OverlayNetworkController {
    processes: Arc<dyn ProcessPort>,
}

impl OverlayNetworkController {
    pub fn new(processes: Arc<dyn ProcessPort>) -> Self {
        OverlayNetworkController { processes }
    }

    /// Returns this node's externally resolvable DNS name.
    ///
    /// Queries the daemon's status interface and picks the peer flagged as
    /// self. Any failure (daemon not running, malformed status output, no
    /// self peer) is terminal for the resolution attempt: overlay
    /// connectivity is a setup concern, not a transient condition, so there
    /// is no retry loop here.
    pub async fn discover(&self) -> Result<String, OverlayError> {
        let raw = self
            .processes
            .run("tailscale", &["status", "--json"])
            .await
            .map_err(OverlayError::NotConnected)?;

        let status: OverlayStatus = serde_json::from_str(&raw)
            .map_err(|e| OverlayError::NotConnected(format!("unparsable status output: {}", e)))?;

        let own = status
            .peers
            .values()
            .find(|p| p.is_self)
            .map(|p| p.dns_name.clone())
            .or_else(|| status.self_peer.map(|p| p.dns_name));

        match own {
            Some(name) if !name.is_empty() => Ok(utils::trim_fqdn(&name).to_string()),
            _ => Err(OverlayError::NotConnected(
                "no peer is flagged as self".to_string(),
            )),
        }
    }

    /// Joins the overlay network and returns the discovered hostname.
    ///
    /// Starts the daemon in user-space networking mode (no TUN device
    /// privileges needed), authenticates with the provided key under a
    /// collision-resistant hostname, tags the node for identification, and
    /// enables the network's TLS-terminating forwarder for the local port.
    pub async fn join(
        &self,
        auth_key: &str,
        hostname_hint: &str,
        local_port: u16,
    ) -> Result<String, OverlayError> {
        let hostname = if hostname_hint == DEFAULT_HOSTNAME_HINT {
            format!("{}-{}", hostname_hint, utils::random_suffix(4))
        } else {
            hostname_hint.to_string()
        };

        info!("Joining overlay network as {}...", hostname);

        self.processes
            .launch("tailscaled", &["--tun=userspace-networking"])
            .await
            .map_err(OverlayError::Join)?;

        let key_arg = format!("--authkey={}", auth_key);
        let hostname_arg = format!("--hostname={}", hostname);
        self.processes
            .run(
                "tailscale",
                &[
                    "up",
                    &key_arg,
                    &hostname_arg,
                    "--advertise-tags=tag:sporemote",
                ],
            )
            .await
            .map_err(OverlayError::Join)?;

        // The network edge terminates TLS and forwards plain HTTP to us.
        let serve_arg = format!("--http={}", local_port);
        self.processes
            .run("tailscale", &["serve", &serve_arg, "--bg"])
            .await
            .map_err(OverlayError::Join)?;

        let discovered = self.discover().await?;
        success!("Joined overlay network as {}", discovered);
        Ok(discovered)
    }
}
