//! Spotify Remote Library
//!
//! This library implements a small self-hosted web remote for Spotify
//! playback. The interesting part is not the playback calls (a thin
//! pass-through to the Spotify Web API) but making the server's OAuth
//! callback reachable from outside the machine: Spotify only redirects to
//! pre-registered HTTPS URIs, so the server has to work out a publicly
//! reachable base URL for itself and notice when that URL drifts away from
//! the one the operator registered.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints served by the embedded web server
//! - `config` - Configuration management and environment variables
//! - `exposure` - Exposure strategy resolution (tunnel, overlay network,
//!   self-signed or managed TLS, plain localhost)
//! - `management` - Persisted state: token cache, callback-URL record,
//!   first-run marker
//! - `server` - The embedded HTTP/HTTPS server
//! - `spotify` - Spotify Web API client (OAuth and playback)
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporemote::{config, exposure};
//!
//! #[tokio::main]
//! async fn main() -> sporemote::Res<()> {
//!     config::load_env().await?;
//!     let resolved = exposure::ExposureResolver::from_env().resolve().await?;
//!     println!("reachable at {}", resolved.base_url);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod exposure;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use sporemote::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```
/// info!("Resolving exposure strategy...");
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
///
/// # Example
///
/// ```
/// success!("Tunnel established at {}", url);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination, such as a missing credential
/// or a failed exposure resolution in the CLI.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible; request handlers must never use it.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program
/// termination, such as callback-URL drift or an unwritable cache file.
///
/// # Example
///
/// ```
/// warning!("Cache file not writable, continuing in memory: {}", e);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
