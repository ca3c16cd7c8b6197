use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use sporemote::exposure::process::ProcessPort;
use sporemote::exposure::tunnel::{TunnelController, TunnelError};

/// Process port that pretends every external command worked.
struct FakeProcesses;

#[async_trait]
impl ProcessPort for FakeProcesses {
    async fn run(&self, _program: &str, _args: &[&str]) -> Result<String, String> {
        Ok(String::new())
    }

    async fn launch(&self, _program: &str, _args: &[&str]) -> Result<(), String> {
        Ok(())
    }
}

/// Serves a fake tunnel status API on an ephemeral port. The handler
/// reports an HTTPS tunnel only from the `ready_after`-th poll on; the
/// counter records how many polls arrived.
async fn fake_status_api(ready_after: u32, counter: Arc<AtomicU32>) -> String {
    let handler_counter = Arc::clone(&counter);
    let app = Router::new().route(
        "/api/tunnels",
        get(move || {
            let counter = Arc::clone(&handler_counter);
            async move {
                let polls = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if ready_after > 0 && polls >= ready_after {
                    Json::<Value>(json!({
                        "tunnels": [
                            { "proto": "http", "public_url": "http://abc123.ngrok-free.app" },
                            { "proto": "https", "public_url": "https://abc123.ngrok-free.app" },
                        ]
                    }))
                } else {
                    Json::<Value>(json!({ "tunnels": [] }))
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/tunnels", addr)
}

fn controller(status_url: String, attempts: u32) -> TunnelController {
    TunnelController::new("test-token".to_string(), 5000, Arc::new(FakeProcesses))
        .with_status_api(status_url, attempts, Duration::from_millis(10))
}

#[tokio::test]
async fn test_start_succeeds_once_tunnel_is_listed() {
    let polls = Arc::new(AtomicU32::new(0));
    let status_url = fake_status_api(4, Arc::clone(&polls)).await;

    let tunnel = controller(status_url, 10);
    let url = tunnel.start().await.unwrap();

    // The HTTPS tunnel is picked, not the HTTP one
    assert_eq!(url, "https://abc123.ngrok-free.app");

    // Success on the 4th poll stops the loop
    assert_eq!(polls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_start_fails_after_attempt_budget() {
    let polls = Arc::new(AtomicU32::new(0));
    let status_url = fake_status_api(0, Arc::clone(&polls)).await;

    let tunnel = controller(status_url, 5);
    let err = tunnel.start().await.unwrap_err();

    assert!(matches!(err, TunnelError::Unreachable { attempts: 5 }));

    // Exactly the configured budget, no unbounded spinning
    assert_eq!(polls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_start_is_idempotent_while_active() {
    let polls = Arc::new(AtomicU32::new(0));
    let status_url = fake_status_api(1, Arc::clone(&polls)).await;

    let tunnel = controller(status_url, 10);
    let first = tunnel.start().await.unwrap();
    let second = tunnel.start().await.unwrap();

    assert_eq!(first, second);

    // The second call returned the stored URL without polling again
    assert_eq!(polls.load(Ordering::SeqCst), 1);
    assert_eq!(tunnel.public_url().await, Some(first));
}

#[tokio::test]
async fn test_start_fails_when_status_api_is_down() {
    // Nothing is listening here
    let tunnel = controller("http://127.0.0.1:9/api/tunnels".to_string(), 3);
    let err = tunnel.start().await.unwrap_err();

    assert!(matches!(err, TunnelError::Unreachable { attempts: 3 }));
}
