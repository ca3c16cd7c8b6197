//! # API Module
//!
//! HTTP endpoints served by the embedded web server. This is a thin layer:
//! every handler translates a request into calls against the exposure
//! state, the token cache or the Spotify client, and renders the result.
//!
//! ## Endpoints
//!
//! ### Pages
//!
//! - [`index`] - the entry page: setup instructions while the tunnel
//!   strategy is configured but unresolved on a first run, the login page
//!   while unauthenticated, the playback controls otherwise.
//!
//! ### Authentication
//!
//! - [`callback`] - OAuth callback from Spotify's authorization server;
//!   exchanges the code, persists the token, redirects home. Failures
//!   redirect home too - re-authorization is always recoverable.
//!
//! ### Exposure
//!
//! - [`exposure_url`] - the currently resolved public URL and callback URL.
//! - [`expose`] - explicit resolution trigger; idempotent when already
//!   resolved, rejected while another resolution is in flight.
//!
//! ### Playback
//!
//! - [`playback`], [`play`], [`pause`], [`next`], [`previous`],
//!   [`volume`], [`seek`] - pass-through player controls. All answer 401
//!   when no valid token is cached.
//!
//! ### Monitoring
//!
//! - [`health`] - status and version information.
//!
//! ## Conventions
//!
//! Handlers are async functions wired into Axum's router in
//! [`crate::server`], with shared state injected through `Extension`.
//! Playback handlers never mutate exposure or client state; they read the
//! current configuration and issue short-lived API calls.

mod callback;
mod exposure;
mod health;
mod pages;
mod player;

pub use callback::callback;
pub use exposure::expose;
pub use exposure::exposure_url;
pub use health::health;
pub use pages::index;
pub use player::next;
pub use player::pause;
pub use player::play;
pub use player::playback;
pub use player::previous;
pub use player::seek;
pub use player::volume;

use std::sync::Arc;

use crate::{config, exposure::ExposureState, utils};

/// The redirect URI the OAuth client should currently be bound to: the
/// resolved endpoint's callback URL, or the localhost fallback while
/// nothing is resolved.
pub(crate) async fn redirect_uri(state: &Arc<ExposureState>) -> String {
    match state.current().await {
        Some(endpoint) => endpoint.callback_url(),
        None => utils::callback_url(&format!("http://localhost:{}", config::port())),
    }
}
