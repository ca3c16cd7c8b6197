use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use tokio::sync::Notify;

use sporemote::exposure::overlay::OverlayError;
use sporemote::exposure::process::ProcessPort;
use sporemote::exposure::{
    ExposureConfig, ExposureError, ExposureResolver, ExposureState, select_strategy,
};
use sporemote::management::RedirectStateStore;
use sporemote::types::ExposureStrategy;
use sporemote::utils;

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sporemote-test-{}-{}-{}",
        tag,
        std::process::id(),
        utils::random_suffix(8)
    ))
}

/// Configuration with no exposure precondition satisfied.
fn base_config(cache_dir: PathBuf, certs_dir: PathBuf) -> ExposureConfig {
    ExposureConfig {
        port: 5000,
        domain: None,
        tunnel_enabled: true,
        tunnel_authtoken: None,
        tunnel_status_url: "http://localhost:4040/api/tunnels".to_string(),
        overlay_authkey: None,
        self_signed: false,
        certs_dir,
        cache_dir,
    }
}

fn empty_config(tag: &str) -> ExposureConfig {
    base_config(
        temp_dir(&format!("{}-cache", tag)),
        temp_dir(&format!("{}-certs", tag)),
    )
}

const STATUS_WITH_SELF_PEER: &str = r#"{
    "Self": {"IsSelf": true, "DNSName": "node-1.example.ts.net."},
    "Peer": {
        "peer-a": {"IsSelf": false, "DNSName": "phone.example.ts.net."},
        "peer-b": {"IsSelf": true, "DNSName": "node-1.example.ts.net."}
    }
}"#;

const STATUS_WITHOUT_PEERS: &str = r#"{
    "Self": {"IsSelf": true, "DNSName": "node-1.example.ts.net."},
    "Peer": {}
}"#;

/// Fake overlay client: answers status queries with a canned JSON document
/// and records every invoked command line.
struct FakeOverlay {
    status: Result<String, String>,
    commands: Mutex<Vec<String>>,
}

impl FakeOverlay {
    fn connected(status: &str) -> Arc<Self> {
        Arc::new(FakeOverlay {
            status: Ok(status.to_string()),
            commands: Mutex::new(Vec::new()),
        })
    }

    fn down() -> Arc<Self> {
        Arc::new(FakeOverlay {
            status: Err("tailscaled is not running".to_string()),
            commands: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessPort for FakeOverlay {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, String> {
        self.commands
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));

        if program == "tailscale" && args.first() == Some(&"status") {
            self.status.clone()
        } else {
            Ok(String::new())
        }
    }

    async fn launch(&self, program: &str, args: &[&str]) -> Result<(), String> {
        self.commands
            .lock()
            .unwrap()
            .push(format!("{} {}", program, args.join(" ")));
        Ok(())
    }
}

/// Overlay fake whose status query blocks until released, for exercising
/// the in-flight guard.
struct BlockingOverlay {
    gate: Notify,
}

#[async_trait]
impl ProcessPort for BlockingOverlay {
    async fn run(&self, _program: &str, _args: &[&str]) -> Result<String, String> {
        self.gate.notified().await;
        Ok(STATUS_WITH_SELF_PEER.to_string())
    }

    async fn launch(&self, _program: &str, _args: &[&str]) -> Result<(), String> {
        Ok(())
    }
}

#[test]
fn test_selection_defaults_to_local_only() {
    let config = empty_config("select-empty");
    assert_eq!(select_strategy(&config), ExposureStrategy::LocalOnly);
}

#[test]
fn test_selection_priority_order() {
    // Self-signed only
    let mut config = empty_config("select-priority");
    config.self_signed = true;
    assert_eq!(select_strategy(&config), ExposureStrategy::SelfSignedTls);

    // Tunnel credentials beat self-signed
    config.tunnel_authtoken = Some("ngrok-token".to_string());
    assert_eq!(select_strategy(&config), ExposureStrategy::ReverseTunnel);

    // ...but only while tunneling is enabled
    config.tunnel_enabled = false;
    assert_eq!(select_strategy(&config), ExposureStrategy::SelfSignedTls);
    config.tunnel_enabled = true;

    // Overlay credentials beat the tunnel
    config.overlay_authkey = Some("tskey-auth-test".to_string());
    assert_eq!(select_strategy(&config), ExposureStrategy::OverlayNetwork);

    // A managed certificate pair beats everything
    std::fs::create_dir_all(&config.certs_dir).unwrap();
    std::fs::write(config.certs_dir.join("cert.pem"), "cert").unwrap();
    std::fs::write(config.certs_dir.join("key.pem"), "key").unwrap();
    assert_eq!(select_strategy(&config), ExposureStrategy::ManagedTls);
}

#[tokio::test]
async fn test_resolve_local_only() {
    let resolver = ExposureResolver::new(empty_config("resolve-local"));
    let endpoint = resolver.resolve().await.unwrap();

    assert_eq!(endpoint.strategy, ExposureStrategy::LocalOnly);
    assert_eq!(endpoint.base_url, "http://localhost:5000");
    assert_eq!(endpoint.callback_url(), "http://localhost:5000/callback");
    assert!(!endpoint.terminates_tls_locally);
    assert!(endpoint.tls_files.is_none());
}

#[tokio::test]
async fn test_resolve_overlay_discovers_hostname() {
    let mut config = empty_config("resolve-overlay");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let overlay = FakeOverlay::connected(STATUS_WITH_SELF_PEER);
    let resolver = ExposureResolver::with_processes(config, overlay.clone());
    let endpoint = resolver.resolve().await.unwrap();

    assert_eq!(endpoint.strategy, ExposureStrategy::OverlayNetwork);
    assert_eq!(endpoint.base_url, "https://node-1.example.ts.net:5000");

    // The overlay edge terminates TLS, not us
    assert!(!endpoint.terminates_tls_locally);

    // Steady state only discovers; it never joins on its own
    let commands = overlay.recorded();
    assert_eq!(commands, vec!["tailscale status --json".to_string()]);
}

#[tokio::test]
async fn test_resolve_overlay_falls_back_to_self_entry() {
    let mut config = empty_config("resolve-overlay-self");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let overlay = FakeOverlay::connected(STATUS_WITHOUT_PEERS);
    let resolver = ExposureResolver::with_processes(config, overlay);
    let endpoint = resolver.resolve().await.unwrap();

    assert_eq!(endpoint.base_url, "https://node-1.example.ts.net:5000");
}

#[tokio::test]
async fn test_resolve_overlay_failure_does_not_fall_back() {
    let mut config = empty_config("resolve-overlay-down");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let resolver = ExposureResolver::with_processes(config, FakeOverlay::down());
    let err = resolver.resolve().await.unwrap_err();

    // Fail fast with the selected strategy's error; no silent downgrade
    assert!(matches!(
        err,
        ExposureError::Overlay(OverlayError::NotConnected(_))
    ));
}

#[tokio::test]
async fn test_resolve_self_signed_provisions_certificate() {
    let mut config = empty_config("resolve-selfsigned");
    config.self_signed = true;

    let resolver = ExposureResolver::new(config);
    let endpoint = resolver.resolve().await.unwrap();

    assert_eq!(endpoint.strategy, ExposureStrategy::SelfSignedTls);
    assert_eq!(endpoint.base_url, "https://localhost:5000");
    assert!(endpoint.terminates_tls_locally);

    let pair = endpoint.tls_files.unwrap();
    assert!(pair.cert.is_file());
    assert!(pair.key.is_file());
}

#[tokio::test]
async fn test_resolve_managed_requires_domain() {
    let mut config = empty_config("resolve-managed-nodomain");
    std::fs::create_dir_all(&config.certs_dir).unwrap();
    std::fs::write(config.certs_dir.join("cert.pem"), "cert").unwrap();
    std::fs::write(config.certs_dir.join("key.pem"), "key").unwrap();

    let resolver = ExposureResolver::new(config.clone());
    let err = resolver.resolve().await.unwrap_err();
    assert!(matches!(err, ExposureError::Configuration(_)));

    config.domain = Some("remote.example.com".to_string());
    let resolver = ExposureResolver::new(config);
    let endpoint = resolver.resolve().await.unwrap();

    assert_eq!(endpoint.strategy, ExposureStrategy::ManagedTls);
    assert_eq!(endpoint.base_url, "https://remote.example.com:5000");
    assert!(endpoint.terminates_tls_locally);
}

#[tokio::test]
async fn test_reresolution_reports_drift_against_recorded_callback() {
    let cache_dir = temp_dir("drift-cache");
    let certs_dir = temp_dir("drift-certs");

    // Empty configuration resolves to localhost and records its callback
    let resolver = ExposureResolver::new(base_config(cache_dir.clone(), certs_dir.clone()));
    let endpoint = resolver.resolve().await.unwrap();
    assert_eq!(endpoint.base_url, "http://localhost:5000");

    // The overlay URL drifts from the recorded localhost callback
    let store = RedirectStateStore::new(cache_dir.clone());
    let status = store
        .record_and_compare("https://node-1.example.ts.net:5000/callback")
        .await;
    assert!(status.changed);
    assert_eq!(
        status.previous,
        Some("http://localhost:5000/callback".to_string())
    );

    // Resolving with overlay credentials present lands on the same URL
    let mut config = base_config(cache_dir, certs_dir);
    config.overlay_authkey = Some("tskey-auth-test".to_string());
    let resolver =
        ExposureResolver::with_processes(config, FakeOverlay::connected(STATUS_WITH_SELF_PEER));
    let endpoint = resolver.resolve().await.unwrap();
    assert_eq!(endpoint.base_url, "https://node-1.example.ts.net:5000");
}

#[tokio::test]
async fn test_overlay_join_runs_the_setup_sequence() {
    let overlay_processes = FakeOverlay::connected(STATUS_WITH_SELF_PEER);
    let mut config = empty_config("join");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let resolver = ExposureResolver::with_processes(config, overlay_processes.clone());
    let hostname = resolver
        .overlay()
        .join("tskey-auth-test", "living-room", 5000)
        .await
        .unwrap();

    assert_eq!(hostname, "node-1.example.ts.net");

    let commands = overlay_processes.recorded();
    assert_eq!(commands[0], "tailscaled --tun=userspace-networking");
    assert!(commands[1].starts_with("tailscale up --authkey=tskey-auth-test"));
    assert!(commands[1].contains("--hostname=living-room"));
    assert!(commands[2].contains("tailscale serve --http=5000 --bg"));
}

#[tokio::test]
async fn test_overlay_join_suffixes_the_default_hint() {
    let overlay_processes = FakeOverlay::connected(STATUS_WITH_SELF_PEER);
    let mut config = empty_config("join-suffix");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let resolver = ExposureResolver::with_processes(config, overlay_processes.clone());
    resolver
        .overlay()
        .join("tskey-auth-test", "sporemote", 5000)
        .await
        .unwrap();

    let commands = overlay_processes.recorded();
    let up = commands
        .iter()
        .find(|c| c.starts_with("tailscale up"))
        .unwrap();

    // The placeholder hint gets a random suffix; an explicit one would not
    let hostname_arg = up
        .split_whitespace()
        .find(|a| a.starts_with("--hostname="))
        .unwrap();
    assert!(hostname_arg.starts_with("--hostname=sporemote-"));
    assert_eq!(hostname_arg.len(), "--hostname=sporemote-".len() + 4);
}

#[tokio::test]
async fn test_concurrent_resolution_is_rejected() {
    let mut config = empty_config("in-flight");
    config.overlay_authkey = Some("tskey-auth-test".to_string());

    let blocking = Arc::new(BlockingOverlay {
        gate: Notify::new(),
    });
    let state = Arc::new(ExposureState::new(ExposureResolver::with_processes(
        config,
        blocking.clone(),
    )));

    let first = {
        let state = Arc::clone(&state);
        tokio::spawn(async move { state.resolve().await })
    };

    // Let the first pass reach its blocked status query
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let second = state.resolve().await;
    assert!(matches!(second, Err(ExposureError::InProgress)));

    blocking.gate.notify_one();
    let endpoint = first.await.unwrap().unwrap();
    assert_eq!(endpoint.base_url, "https://node-1.example.ts.net:5000");

    // The finished pass installed the endpoint in the shared slot
    assert_eq!(
        state.current().await.unwrap().base_url,
        "https://node-1.example.ts.net:5000"
    );
}
