use axum::{
    Extension, Router,
    routing::{get, post},
};
use axum_server::tls_rustls::RustlsConfig;
use std::{net::SocketAddr, sync::Arc};

use crate::{api, error, exposure::ExposureState, info};

pub fn router(state: Arc<ExposureState>) -> Router {
    Router::new()
        .route("/", get(api::index))
        .route("/callback", get(api::callback))
        .route("/health", get(api::health))
        .route("/api/exposure", get(api::exposure_url))
        .route("/api/expose", post(api::expose))
        .route("/api/playback", get(api::playback))
        .route("/api/play", post(api::play))
        .route("/api/pause", post(api::pause))
        .route("/api/next", post(api::next))
        .route("/api/previous", post(api::previous))
        .route("/api/volume", post(api::volume))
        .route("/api/seek", post(api::seek))
        .layer(Extension(state))
}

/// Runs the embedded server until the process ends. Terminates TLS itself
/// only when the resolved endpoint says so; for the tunnel and overlay
/// strategies an upstream edge owns TLS and we serve plain HTTP.
pub async fn start_server(state: Arc<ExposureState>) {
    let port = state.resolver().config().port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let tls_files = state
        .current()
        .await
        .filter(|endpoint| endpoint.terminates_tls_locally)
        .and_then(|endpoint| endpoint.tls_files.clone());

    let app = router(state);

    match tls_files {
        Some(pair) => {
            let tls = match RustlsConfig::from_pem_file(&pair.cert, &pair.key).await {
                Ok(tls) => tls,
                Err(e) => error!("Failed to load certificate pair: {}", e),
            };

            info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await
                .unwrap();
        }
        None => {
            info!("Listening on http://{}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
            axum::serve(listener, app).await.unwrap();
        }
    }
}
