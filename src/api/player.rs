use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use crate::{config, management::TokenManager, spotify, spotify::SpotifyAuth};

pub async fn playback() -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };

    match spotify::player::current_playback(&token).await {
        Ok(Some(playback)) => {
            let track = playback.item.as_ref();
            (
                StatusCode::OK,
                Json(json!({
                    "is_playing": playback.is_playing,
                    "track_name": track.map(|t| t.name.clone()).unwrap_or_else(|| "Unknown".to_string()),
                    "artist_name": track
                        .and_then(|t| t.artists.first())
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    "album_name": track
                        .and_then(|t| t.album.as_ref())
                        .map(|a| a.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    "progress_ms": playback.progress_ms.unwrap_or(0),
                    "duration_ms": track.map(|t| t.duration_ms).unwrap_or(0),
                    "device_name": playback
                        .device
                        .map(|d| d.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                })),
            )
        }
        Ok(None) => (StatusCode::OK, Json(json!({ "error": "No active playback" }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

pub async fn play() -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };
    respond(spotify::player::start_playback(&token).await)
}

pub async fn pause() -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };
    respond(spotify::player::pause_playback(&token).await)
}

pub async fn next() -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };
    respond(spotify::player::next_track(&token).await)
}

pub async fn previous() -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };
    respond(spotify::player::previous_track(&token).await)
}

pub async fn volume(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };

    let volume = body["volume"].as_u64().unwrap_or(50).min(100) as u8;
    match spotify::player::set_volume(&token, volume).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "volume": volume })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}

pub async fn seek(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let Some(token) = valid_token().await else {
        return unauthenticated();
    };

    let position_ms = body["position_ms"].as_u64().unwrap_or(0);
    respond(spotify::player::seek(&token, position_ms).await)
}

/// Reads the cached token, refreshing it when needed. The OAuth client is
/// rebuilt against the redirect URI the token was issued for, not the
/// currently resolved one; a refresh is valid regardless of drift.
async fn valid_token() -> Option<String> {
    let mut manager = TokenManager::load(config::cache_dir()).await.ok()?;
    if manager.is_expired() && manager.current_token().refresh_token.is_empty() {
        return None;
    }

    let auth = SpotifyAuth::from_env(manager.current_token().redirect_uri.clone());
    Some(manager.get_valid_token(&auth).await)
}

fn unauthenticated() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Not authenticated" })),
    )
}

fn respond(result: Result<(), reqwest::Error>) -> (StatusCode, Json<Value>) {
    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
