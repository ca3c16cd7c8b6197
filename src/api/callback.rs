use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Redirect};

use crate::{
    config, exposure::ExposureState, management::TokenManager, spotify::SpotifyAuth, warning,
};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<ExposureState>>,
) -> Redirect {
    let Some(code) = params.get("code") else {
        warning!("No authorization code received from Spotify");
        return Redirect::to("/");
    };

    let auth = SpotifyAuth::from_env(super::redirect_uri(&state).await);
    match auth.exchange_code(code).await {
        Ok(token) => {
            let manager = TokenManager::new(config::cache_dir(), token);
            if let Err(e) = manager.persist().await {
                warning!("Could not persist token cache: {}", e);
            }
        }
        Err(e) => warning!("Token exchange failed: {}", e),
    }

    Redirect::to("/")
}
