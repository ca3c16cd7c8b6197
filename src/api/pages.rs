use std::sync::Arc;

use axum::{Extension, response::Html};

use crate::{
    config,
    exposure::ExposureState,
    management::{RedirectStateStore, TokenManager},
    spotify::{self, SpotifyAuth},
    types::PlaybackState,
};

pub async fn index(Extension(state): Extension<Arc<ExposureState>>) -> Html<String> {
    let exposure_config = state.resolver().config();

    // Setup gate: the tunnel strategy is configured but nothing is exposed
    // yet, and this is a first run (or setup was forced).
    let tunnel_configured =
        exposure_config.tunnel_enabled && exposure_config.tunnel_authtoken.is_some();
    if tunnel_configured && state.current().await.is_none() {
        let store = RedirectStateStore::new(exposure_config.cache_dir.clone());
        if store.is_first_run().await || config::force_setup() {
            return Html(setup_page(state.last_error().await));
        }
    }

    if !TokenManager::is_authenticated(exposure_config.cache_dir.clone()).await {
        let auth = SpotifyAuth::from_env(super::redirect_uri(&state).await);
        return Html(login_page(&auth.authorize_url()));
    }

    let Ok(mut manager) = TokenManager::load(exposure_config.cache_dir.clone()).await else {
        let auth = SpotifyAuth::from_env(super::redirect_uri(&state).await);
        return Html(login_page(&auth.authorize_url()));
    };

    let auth = SpotifyAuth::from_env(manager.current_token().redirect_uri.clone());
    let token = manager.get_valid_token(&auth).await;

    match spotify::player::current_playback(&token).await {
        Ok(playback) => Html(control_page(playback)),
        Err(_) => {
            // Token likely revoked; send the user back through authorization.
            let auth = SpotifyAuth::from_env(super::redirect_uri(&state).await);
            Html(login_page(&auth.authorize_url()))
        }
    }
}

fn setup_page(last_error: Option<String>) -> String {
    let error_block = match last_error {
        Some(e) => format!("<p class=\"err\">Last attempt failed: {}</p>", e),
        None => String::new(),
    };

    format!(
        "<!doctype html><html><head><title>Spotify Remote - Setup</title></head><body>\
         <h1>Spotify Remote</h1>\
         <p>The public tunnel has not been started yet.</p>{error_block}\
         <button onclick=\"expose()\">Start tunnel</button>\
         <pre id=\"out\"></pre>\
         <script>\
         async function expose() {{\
           const res = await fetch('/api/expose', {{method: 'POST'}});\
           const body = await res.json();\
           document.getElementById('out').textContent = res.ok\
             ? 'Public URL: ' + body.url + '\\nRegister this callback URL with Spotify: ' + body.callback_url\
             : 'Error: ' + body.error;\
         }}\
         </script></body></html>"
    )
}

fn login_page(auth_url: &str) -> String {
    format!(
        "<!doctype html><html><head><title>Spotify Remote - Login</title></head><body>\
         <h1>Spotify Remote</h1>\
         <p><a href=\"{auth_url}\">Log in with Spotify</a></p>\
         </body></html>"
    )
}

fn control_page(playback: Option<PlaybackState>) -> String {
    let now_playing = match playback {
        Some(p) => {
            let track = p
                .item
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let artist = p
                .item
                .as_ref()
                .and_then(|t| t.artists.first())
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            format!("{} - {}", artist, track)
        }
        None => "Nothing playing".to_string(),
    };

    format!(
        "<!doctype html><html><head><title>Spotify Remote</title></head><body>\
         <h1>Spotify Remote</h1>\
         <p id=\"now\">{now_playing}</p>\
         <button onclick=\"act('previous')\">&#9198;</button>\
         <button onclick=\"act('play')\">&#9654;</button>\
         <button onclick=\"act('pause')\">&#9208;</button>\
         <button onclick=\"act('next')\">&#9197;</button>\
         <input type=\"range\" min=\"0\" max=\"100\" onchange=\"setVolume(this.value)\">\
         <script>\
         async function act(a) {{ await fetch('/api/' + a, {{method: 'POST'}}); refresh(); }}\
         async function setVolume(v) {{\
           await fetch('/api/volume', {{method: 'POST', headers: {{'Content-Type': 'application/json'}}, body: JSON.stringify({{volume: Number(v)}})}});\
         }}\
         async function refresh() {{\
           const res = await fetch('/api/playback');\
           if (!res.ok) return;\
           const p = await res.json();\
           if (p.track_name) document.getElementById('now').textContent = p.artist_name + ' - ' + p.track_name;\
         }}\
         setInterval(refresh, 5000);\
         </script></body></html>"
    )
}
