//! Reko mood-based music recommender library
//!
//! This library turns a mood or free-text query into playable Spotify tracks.
//! An LLM completion service suggests song names, the catalog search resolves
//! them, and the results can be played on a Spotify Connect device, liked and
//! exported as a playlist.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local authorization callback server
//! - `cli` - Command-line interface implementations
//! - `completion` - LLM completion client and query splitting
//! - `config` - Configuration management and environment variables
//! - `likes` - Client for the liked-songs persistence service
//! - `management` - Credential lifecycle, search orchestration and playback state
//! - `server` - Local HTTP server for the authorization callback
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use reko::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> reko::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod completion;
pub mod config;
pub mod likes;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Result alias used by the command-line layer.
///
/// Core components return their own error enums; the CLI boxes them so that
/// configuration, cache and HTTP failures can be reported through one path.
///
/// # Example
///
/// ```
/// use reko::Res;
///
/// async fn load() -> Res<usize> {
///     Ok(3)
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line prefixed with a blue `o`.
///
/// Accepts the same arguments as `println!`.
///
/// ```
/// info!("Asking for songs matching {}", mood);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green checkmark after an operation went through.
///
/// ```
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red error line and terminates the process with exit code 1.
///
/// Only the CLI layer uses this macro. Library components log with
/// [`warning!`] and degrade instead of exiting.
///
/// ```
/// error!("Missing required environment variable: {}", name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a line prefixed with a yellow `!` for recoverable problems.
///
/// ```
/// warning!("Search for {} failed: {}", query, err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
