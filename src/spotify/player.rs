use reqwest::{Client, StatusCode};

use crate::{config, types::PlaybackState};

pub async fn current_playback(token: &str) -> Result<Option<PlaybackState>, reqwest::Error> {
    let api_url = format!("{}/me/player", config::spotify_api_url());

    let client = Client::new();
    let response = client
        .get(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;

    // No active playback session anywhere.
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let playback = response.json::<PlaybackState>().await?;
    Ok(Some(playback))
}

pub async fn start_playback(token: &str) -> Result<(), reqwest::Error> {
    put_empty(token, "me/player/play").await
}

pub async fn pause_playback(token: &str) -> Result<(), reqwest::Error> {
    put_empty(token, "me/player/pause").await
}

pub async fn next_track(token: &str) -> Result<(), reqwest::Error> {
    let api_url = format!("{}/me/player/next", config::spotify_api_url());

    let client = Client::new();
    client
        .post(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

pub async fn previous_track(token: &str) -> Result<(), reqwest::Error> {
    let api_url = format!("{}/me/player/previous", config::spotify_api_url());

    let client = Client::new();
    client
        .post(&api_url)
        .bearer_auth(token)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

pub async fn set_volume(token: &str, volume_percent: u8) -> Result<(), reqwest::Error> {
    let path = format!("me/player/volume?volume_percent={}", volume_percent);
    put_empty(token, &path).await
}

pub async fn seek(token: &str, position_ms: u64) -> Result<(), reqwest::Error> {
    let path = format!("me/player/seek?position_ms={}", position_ms);
    put_empty(token, &path).await
}

async fn put_empty(token: &str, path: &str) -> Result<(), reqwest::Error> {
    let api_url = format!("{}/{}", config::spotify_api_url(), path);

    let client = Client::new();
    client
        .put(&api_url)
        .bearer_auth(token)
        .header("Content-Length", 0)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
