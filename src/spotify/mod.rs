//! # Spotify Integration Module
//!
//! The client side of the Spotify Web API: the OAuth authorization-code
//! flow and the playback pass-through calls the remote forwards.
//!
//! ## Authentication
//!
//! [`auth`] implements the server-side authorization-code flow. The client
//! is a pure construction bound to whatever redirect URI the exposure
//! resolver produced; the authorization URL sends the user to Spotify, the
//! callback route hands the returned code to [`SpotifyAuth::exchange_code`],
//! and the resulting token is persisted by the management layer together
//! with the redirect URI it was issued against. Refreshing an expired
//! token goes through [`SpotifyAuth::refresh`].
//!
//! Because Spotify validates the redirect URI on every exchange, a drifted
//! exposure URL surfaces here as a rejected exchange - which is exactly why
//! the exposure module warns about drift before anyone hits this code.
//!
//! ## Playback
//!
//! [`player`] wraps the handful of player endpoints the remote needs:
//! current playback, play/pause, next/previous, volume and seek. All calls
//! are short-lived bearer-token requests and may run concurrently; they
//! only ever read the token, never mutate client state.
//!
//! ## Error Types
//!
//! - `reqwest::Error` for HTTP and API failures on playback calls
//! - `String` for authentication and token plumbing, matching the
//!   management layer

pub mod auth;
pub mod player;

pub use auth::SpotifyAuth;
