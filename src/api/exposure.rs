use std::sync::Arc;

use axum::{Extension, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::{
    exposure::{ExposureError, ExposureState},
    management::RedirectStateStore,
};

pub async fn exposure_url(
    Extension(state): Extension<Arc<ExposureState>>,
) -> (StatusCode, Json<Value>) {
    if let Some(endpoint) = state.current().await {
        return (
            StatusCode::OK,
            Json(json!({
                "strategy": endpoint.strategy.to_string(),
                "url": endpoint.base_url,
                "callback_url": endpoint.callback_url(),
            })),
        );
    }

    if let Some(error) = state.last_error().await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": error })),
        );
    }

    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Exposure not resolved" })),
    )
}

pub async fn expose(Extension(state): Extension<Arc<ExposureState>>) -> (StatusCode, Json<Value>) {
    // Already exposed: report the existing endpoint instead of launching
    // another resolution.
    if let Some(endpoint) = state.current().await {
        return (
            StatusCode::OK,
            Json(json!({
                "url": endpoint.base_url,
                "callback_url": endpoint.callback_url(),
            })),
        );
    }

    match state.resolve().await {
        Ok(endpoint) => {
            let cache_dir = state.resolver().config().cache_dir.clone();
            RedirectStateStore::new(cache_dir).mark_first_run_done().await;
            (
                StatusCode::OK,
                Json(json!({
                    "url": endpoint.base_url,
                    "callback_url": endpoint.callback_url(),
                })),
            )
        }
        Err(ExposureError::InProgress) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": ExposureError::InProgress.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
