use std::{sync::Arc, time::Duration};

use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{info, types::TunnelsResponse};

use super::process::ProcessPort;

/// Local status API of the ngrok agent.
pub const DEFAULT_STATUS_URL: &str = "http://localhost:4040/api/tunnels";

/// Tunnel startup is asynchronous; polling is bounded so a tunnel that
/// never comes up fails the resolution instead of hanging it.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("failed to launch tunnel client: {0}")]
    Launch(String),

    #[error("no HTTPS tunnel appeared after {attempts} status polls")]
    Unreachable { attempts: u32 },
}

/// Starts the ngrok agent for the local port and extracts its assigned
/// public HTTPS endpoint from the agent's local status API.
///
/// `start` is idempotent per process: once a tunnel URL has been obtained,
/// later calls return it without touching the agent again.
pub struct TunnelController {
    authtoken: String,
    local_port: u16,
    status_url: String,
    attempts: u32,
    interval: Duration,
    processes: Arc<dyn ProcessPort>,
    active: Mutex<Option<String>>,
}

impl TunnelController {
    pub fn new(authtoken: String, local_port: u16, processes: Arc<dyn ProcessPort>) -> Self {
        TunnelController {
            authtoken,
            local_port,
            status_url: DEFAULT_STATUS_URL.to_string(),
            attempts: DEFAULT_POLL_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
            processes,
            active: Mutex::new(None),
        }
    }

    /// Overrides the status API endpoint and polling budget. The test
    /// suite points this at a fake status server.
    pub fn with_status_api(mut self, url: String, attempts: u32, interval: Duration) -> Self {
        self.status_url = url;
        self.attempts = attempts;
        self.interval = interval;
        self
    }

    /// Returns the public URL of the currently active tunnel, if any.
    pub async fn public_url(&self) -> Option<String> {
        self.active.lock().await.clone()
    }

    /// Brings the tunnel up and returns its public HTTPS URL.
    ///
    /// Stores the agent credential, launches the agent detached, then polls
    /// the status API until an HTTPS tunnel is listed or the attempt budget
    /// runs out. Holding the `active` lock for the whole pass also
    /// serializes concurrent callers onto a single agent launch.
    pub async fn start(&self) -> Result<String, TunnelError> {
        let mut active = self.active.lock().await;
        if let Some(url) = active.as_ref() {
            return Ok(url.clone());
        }

        self.processes
            .run("ngrok", &["config", "add-authtoken", &self.authtoken])
            .await
            .map_err(TunnelError::Launch)?;

        let port = self.local_port.to_string();
        self.processes
            .launch("ngrok", &["http", &port, "--log=stdout"])
            .await
            .map_err(TunnelError::Launch)?;

        info!("Waiting for tunnel to come up...");

        let client = Client::builder()
            .timeout(self.interval.max(Duration::from_secs(2)))
            .build()
            .map_err(|e| TunnelError::Launch(e.to_string()))?;

        for attempt in 0..self.attempts {
            if attempt > 0 {
                tokio::time::sleep(self.interval).await;
            }
            if let Some(url) = self.poll_once(&client).await {
                *active = Some(url.clone());
                return Ok(url);
            }
        }

        Err(TunnelError::Unreachable {
            attempts: self.attempts,
        })
    }

    async fn poll_once(&self, client: &Client) -> Option<String> {
        let response = client.get(&self.status_url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }

        let listed: TunnelsResponse = response.json().await.ok()?;
        listed
            .tunnels
            .into_iter()
            .find(|t| t.proto == "https")
            .map(|t| t.public_url)
    }
}
