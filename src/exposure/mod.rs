//! # Exposure Module
//!
//! Makes the server's OAuth callback reachable by Spotify. Spotify only
//! redirects to pre-registered HTTPS URIs, so before any login can work the
//! server has to know the base URL it is reachable under from the outside.
//!
//! ## Strategies
//!
//! Exactly one exposure strategy is active per process lifetime, picked in
//! a fixed priority order from configuration:
//!
//! 1. **Managed TLS** - an externally managed certificate pair exists at
//!    the configured path; the server terminates TLS itself under the
//!    configured domain.
//! 2. **Overlay network** - a tailscale auth key is configured; the node's
//!    DNS name is discovered from the running daemon and the overlay edge
//!    terminates TLS upstream.
//! 3. **Reverse tunnel** - an ngrok auth token is configured and tunneling
//!    is enabled; the agent's assigned public HTTPS URL is used.
//! 4. **Self-signed TLS** - explicitly requested; a certificate pair is
//!    generated once and served locally.
//! 5. **Local only** - plain HTTP on localhost, the fallback when nothing
//!    is configured.
//!
//! A selected strategy whose controller fails never falls back to a
//! lower-priority one: the operator registered a specific callback URL with
//! Spotify, and silently switching strategies would register intent the
//! operator does not know about.
//!
//! ## Drift
//!
//! Every successful resolution records the resulting callback URL and
//! compares it against the previously recorded one. A change is advisory
//! only (the operator must update the Spotify app settings and
//! re-authorize) and never blocks operation.
//!
//! ## Concurrency
//!
//! One resolution pass at a time: [`ExposureState`] keeps the current
//! endpoint in a single slot that is replaced whole, guarded by an
//! in-flight lock so a concurrent trigger is rejected instead of launching
//! duplicate child processes.

pub mod certs;
pub mod overlay;
pub mod process;
pub mod tunnel;

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::{
    config,
    management::RedirectStateStore,
    types::{CertPair, ExposureStrategy, ResolvedEndpoint},
    warning,
};

use overlay::{OverlayError, OverlayNetworkController};
use process::{ProcessPort, SystemProcesses};
use tunnel::{TunnelController, TunnelError};

/// Inputs the strategy selection is a function of. Assembled from the
/// environment in production; tests build it directly.
#[derive(Debug, Clone)]
pub struct ExposureConfig {
    pub port: u16,
    pub domain: Option<String>,
    pub tunnel_enabled: bool,
    pub tunnel_authtoken: Option<String>,
    pub tunnel_status_url: String,
    pub overlay_authkey: Option<String>,
    pub self_signed: bool,
    pub certs_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl ExposureConfig {
    pub fn from_env() -> Self {
        ExposureConfig {
            port: config::port(),
            domain: config::domain_name(),
            tunnel_enabled: config::use_ngrok(),
            tunnel_authtoken: config::ngrok_authtoken(),
            tunnel_status_url: tunnel::DEFAULT_STATUS_URL.to_string(),
            overlay_authkey: config::tailscale_authkey(),
            self_signed: config::self_signed_tls(),
            certs_dir: config::certs_dir(),
            cache_dir: config::cache_dir(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExposureError {
    #[error("exposure not configured: {0}")]
    Configuration(String),

    #[error("reverse tunnel failed: {0}")]
    Tunnel(#[from] TunnelError),

    #[error("overlay network failed: {0}")]
    Overlay(#[from] OverlayError),

    #[error("certificate provisioning failed: {0}")]
    Certificate(String),

    #[error("a resolution is already in progress")]
    InProgress,
}

/// Selects the exposure strategy for a configuration. Deterministic given
/// the configuration and the managed-certificate files on disk; first
/// match in priority order wins and no two strategies are ever active.
pub fn select_strategy(config: &ExposureConfig) -> ExposureStrategy {
    if certs::ensure_managed(&config.certs_dir).is_some() {
        ExposureStrategy::ManagedTls
    } else if config.overlay_authkey.is_some() {
        ExposureStrategy::OverlayNetwork
    } else if config.tunnel_enabled && config.tunnel_authtoken.is_some() {
        ExposureStrategy::ReverseTunnel
    } else if config.self_signed {
        ExposureStrategy::SelfSignedTls
    } else {
        ExposureStrategy::LocalOnly
    }
}

/// Runs resolution passes: picks the strategy, delegates to the matching
/// controller, and records the resulting callback URL for drift detection.
pub struct ExposureResolver {
    config: ExposureConfig,
    tunnel: TunnelController,
    overlay: OverlayNetworkController,
}

impl ExposureResolver {
    pub fn from_env() -> Self {
        Self::new(ExposureConfig::from_env())
    }

    pub fn new(config: ExposureConfig) -> Self {
        Self::with_processes(config, Arc::new(SystemProcesses))
    }

    /// Builds a resolver over an explicit process port; tests inject fakes
    /// here.
    pub fn with_processes(config: ExposureConfig, processes: Arc<dyn ProcessPort>) -> Self {
        let tunnel = TunnelController::new(
            config.tunnel_authtoken.clone().unwrap_or_default(),
            config.port,
            Arc::clone(&processes),
        )
        .with_status_api(
            config.tunnel_status_url.clone(),
            tunnel::DEFAULT_POLL_ATTEMPTS,
            tunnel::DEFAULT_POLL_INTERVAL,
        );
        let overlay = OverlayNetworkController::new(processes);

        ExposureResolver {
            config,
            tunnel,
            overlay,
        }
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    pub fn overlay(&self) -> &OverlayNetworkController {
        &self.overlay
    }

    pub fn tunnel(&self) -> &TunnelController {
        &self.tunnel
    }

    /// Strategy the next resolution pass will use.
    pub fn strategy(&self) -> ExposureStrategy {
        select_strategy(&self.config)
    }

    /// One resolution pass.
    ///
    /// Produces a fresh endpoint; a failed delegation surfaces as an
    /// [`ExposureError`] for the selected strategy with no fallback. On
    /// success the callback URL is recorded and compared against the
    /// previously recorded one, warning the operator on drift.
    pub async fn resolve(&self) -> Result<ResolvedEndpoint, ExposureError> {
        let strategy = select_strategy(&self.config);
        let endpoint = match strategy {
            ExposureStrategy::ManagedTls => {
                let domain = self.config.domain.clone().ok_or_else(|| {
                    ExposureError::Configuration(
                        "DOMAIN_NAME must be set when serving a managed certificate".to_string(),
                    )
                })?;
                let (cert, key) = certs::ensure_managed(&self.config.certs_dir).ok_or_else(|| {
                    ExposureError::Certificate(
                        "managed certificate pair disappeared during resolution".to_string(),
                    )
                })?;
                self.endpoint(
                    strategy,
                    format!("https://{}:{}", domain, self.config.port),
                    true,
                    Some(CertPair { cert, key }),
                )
            }
            ExposureStrategy::OverlayNetwork => {
                let hostname = self.overlay.discover().await?;
                self.endpoint(
                    strategy,
                    format!("https://{}:{}", hostname, self.config.port),
                    false,
                    None,
                )
            }
            ExposureStrategy::ReverseTunnel => {
                let url = self.tunnel.start().await?;
                self.endpoint(strategy, url, false, None)
            }
            ExposureStrategy::SelfSignedTls => {
                let identity = self
                    .config
                    .domain
                    .clone()
                    .unwrap_or_else(|| "localhost".to_string());
                let (cert, key) = certs::ensure_self_signed(
                    &self.config.cache_dir,
                    &identity,
                    certs::DEFAULT_VALIDITY_DAYS,
                )
                .await
                .map_err(ExposureError::Certificate)?;
                self.endpoint(
                    strategy,
                    format!("https://{}:{}", identity, self.config.port),
                    true,
                    Some(CertPair { cert, key }),
                )
            }
            ExposureStrategy::LocalOnly => self.endpoint(
                strategy,
                format!("http://localhost:{}", self.config.port),
                false,
                None,
            ),
        };

        let store = RedirectStateStore::new(self.config.cache_dir.clone());
        let drift = store.record_and_compare(&endpoint.callback_url()).await;
        if drift.changed {
            if let Some(previous) = &drift.previous {
                warning!(
                    "Callback URL changed from {} to {}. Update the redirect URI in your Spotify app settings and re-authorize.",
                    previous,
                    endpoint.callback_url()
                );
            }
        }

        Ok(endpoint)
    }

    fn endpoint(
        &self,
        strategy: ExposureStrategy,
        base_url: String,
        terminates_tls_locally: bool,
        tls_files: Option<CertPair>,
    ) -> ResolvedEndpoint {
        ResolvedEndpoint {
            strategy,
            base_url,
            terminates_tls_locally,
            resolved_at: Utc::now().timestamp() as u64,
            tls_files,
        }
    }
}

/// Process-wide exposure state: the current endpoint in a single slot,
/// replaced whole on re-resolution, plus the in-flight guard that keeps
/// resolution passes from overlapping.
pub struct ExposureState {
    resolver: ExposureResolver,
    current: RwLock<Option<Arc<ResolvedEndpoint>>>,
    last_error: RwLock<Option<String>>,
    in_flight: Mutex<()>,
}

impl ExposureState {
    pub fn new(resolver: ExposureResolver) -> Self {
        ExposureState {
            resolver,
            current: RwLock::new(None),
            last_error: RwLock::new(None),
            in_flight: Mutex::new(()),
        }
    }

    pub fn resolver(&self) -> &ExposureResolver {
        &self.resolver
    }

    pub async fn current(&self) -> Option<Arc<ResolvedEndpoint>> {
        self.current.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Runs one resolution pass and installs the result.
    ///
    /// A trigger arriving while another pass is in flight is rejected with
    /// [`ExposureError::InProgress`] rather than queued, so no duplicate
    /// child processes get launched. Request handlers only ever read
    /// `current`; they never observe a partially updated endpoint.
    pub async fn resolve(&self) -> Result<Arc<ResolvedEndpoint>, ExposureError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(ExposureError::InProgress);
        };

        match self.resolver.resolve().await {
            Ok(endpoint) => {
                let endpoint = Arc::new(endpoint);
                *self.current.write().await = Some(Arc::clone(&endpoint));
                *self.last_error.write().await = None;
                Ok(endpoint)
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }
}
