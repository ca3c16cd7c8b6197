use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;

use crate::{config, types::Token};

/// OAuth client for the authorization-code flow, bound to one redirect URI.
///
/// Construction is pure (no network); rebuilding after a re-resolution
/// fully supersedes the previous client rather than mutating it. The test
/// suite uses [`SpotifyAuth::new`] to point `token_url` at a local
/// stand-in.
#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    auth_url: String,
    token_url: String,
}

impl SpotifyAuth {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        scope: String,
        auth_url: String,
        token_url: String,
    ) -> Self {
        SpotifyAuth {
            client_id,
            client_secret,
            redirect_uri,
            scope,
            auth_url,
            token_url,
        }
    }

    /// Builds a client from the environment, bound to `redirect_uri`.
    pub fn from_env(redirect_uri: String) -> Self {
        Self::new(
            config::spotify_client_id(),
            config::spotify_client_secret(),
            redirect_uri,
            config::spotify_scope(),
            config::spotify_auth_url(),
            config::spotify_token_url(),
        )
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The URL the user is sent to for granting permissions.
    pub fn authorize_url(&self) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}",
            auth_url = self.auth_url,
            client_id = self.client_id,
            redirect_uri = self.redirect_uri,
            scope = self.scope,
        )
    }

    /// Exchanges an authorization code for a token.
    ///
    /// Sends the client credentials as a Basic authorization header; the
    /// redirect URI must match the one the code was issued for, which is
    /// how a drifted exposure URL ultimately fails. The returned token is
    /// stamped with `obtained_at` and the bound redirect URI.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, String> {
        let client = Client::new();
        let res = client
            .post(&self.token_url)
            .header("Authorization", self.basic_credentials())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let json: Value = res.json().await.map_err(|e| e.to_string())?;
        self.token_from_response(&json, None)
    }

    /// Exchanges a refresh token for a fresh access token. The refresh
    /// token may rotate; when the response omits one, the old one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, String> {
        let client = Client::new();
        let res = client
            .post(&self.token_url)
            .header("Authorization", self.basic_credentials())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let json: Value = res.json().await.map_err(|e| e.to_string())?;
        self.token_from_response(&json, Some(refresh_token))
    }

    fn basic_credentials(&self) -> String {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        format!("Basic {}", credentials)
    }

    fn token_from_response(
        &self,
        json: &Value,
        fallback_refresh_token: Option<&str>,
    ) -> Result<Token, String> {
        let Some(access_token) = json["access_token"].as_str() else {
            return Err(format!("token endpoint rejected the request: {}", json));
        };

        let refresh_token = json["refresh_token"]
            .as_str()
            .or(fallback_refresh_token)
            .unwrap_or_default()
            .to_string();

        Ok(Token {
            access_token: access_token.to_string(),
            refresh_token,
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
            redirect_uri: self.redirect_uri.clone(),
        })
    }
}
