use std::path::PathBuf;

use chrono::Utc;

use crate::{spotify::SpotifyAuth, types::Token};

pub const TOKEN_CACHE_FILE: &str = "token.json";

/// Refresh this many seconds before the token actually expires, so an API
/// call issued right at the boundary does not race the clock.
const REFRESH_MARGIN_SECS: u64 = 240;

/// Owns the persisted OAuth token cache.
///
/// An absent or unparsable cache is simply "not authenticated", never an
/// error; every authenticated action checks cache validity first, there is
/// no background refresh loop.
pub struct TokenManager {
    cache_dir: PathBuf,
    token: Token,
}

impl TokenManager {
    pub fn new(cache_dir: PathBuf, token: Token) -> Self {
        TokenManager { cache_dir, token }
    }

    pub async fn load(cache_dir: PathBuf) -> Result<Self, String> {
        let path = cache_dir.join(TOKEN_CACHE_FILE);
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { cache_dir, token })
    }

    /// Reads the cached token, treating any failure as absence.
    pub async fn cached(cache_dir: PathBuf) -> Option<Token> {
        Self::load(cache_dir).await.ok().map(|m| m.token)
    }

    /// Whether a cached, unexpired token exists. Expiry means "not
    /// authenticated", not an error; the route layer redirects back into
    /// the authorization flow.
    pub async fn is_authenticated(cache_dir: PathBuf) -> bool {
        match Self::load(cache_dir).await {
            Ok(manager) => !manager.is_expired(),
            Err(_) => false,
        }
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = self.cache_dir.join(TOKEN_CACHE_FILE);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in
    }

    fn needs_refresh(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + REFRESH_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    /// Returns a usable access token, refreshing through the auth client
    /// when the cached one is about to expire. A failed refresh falls back
    /// to the stale token; the API call will then fail and send the user
    /// back through authorization.
    pub async fn get_valid_token(&mut self, auth: &SpotifyAuth) -> String {
        if self.needs_refresh() {
            if let Ok(new_token) = auth.refresh(&self.token.refresh_token).await {
                self.token = new_token;
                let _ = self.persist().await;
            }
        }

        self.token.access_token.clone()
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
