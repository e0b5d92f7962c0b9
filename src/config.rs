//! Configuration management for reko.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Endpoint URLs fall back to the public
//! Spotify and OpenAI defaults so only credentials have to be provided.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Everything a running session needs is collected once into [`Settings`],
//! which the management components receive by value. Tests build a
//! [`Settings`] by hand and point every endpoint at a local fake server.

use std::{env, fmt, path::PathBuf, time::Duration};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 3_600_000;
pub const DEFAULT_SEARCH_LIMIT: u32 = 1;

/// Scopes requested by the interactive authorization redirect.
pub const AUTHORIZE_SCOPES: [&str; 5] = [
    "streaming",
    "user-read-email",
    "user-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} must be set", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Grant used to obtain the catalog credential from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    ClientCredentials,
    RefreshToken(String),
    /// No grant is available; tokens only arrive through the authorization callback.
    Interactive,
}

/// Settings for the Spotify side: token endpoint, API base and client identity.
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub redirect_uri: String,
    pub user_id: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub spotify: SpotifySettings,
    pub catalog_grant: Grant,
    pub completion: CompletionSettings,
    pub likes_url: Option<String>,
    pub user_id: Option<String>,
    pub server_address: String,
    pub refresh_interval: Duration,
    pub search_limit: u32,
    /// Directory holding the credential, track and playback caches.
    pub data_dir: PathBuf,
}

impl Settings {
    /// Collects the settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing required variable.
    /// Only the Spotify client id and secret are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let spotify = SpotifySettings {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            api_url: or_default("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
            auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            redirect_uri: optional("SPOTIFY_API_REDIRECT_URI").unwrap_or_else(|| {
                format!("http://{}/callback", server_addr())
            }),
            user_id: optional("SPOTIFY_USER_ID"),
            device_id: optional("SPOTIFY_DEVICE_ID"),
        };

        let catalog_grant = match optional("SPOTIFY_REFRESH_TOKEN") {
            Some(token) => Grant::RefreshToken(token),
            None => Grant::ClientCredentials,
        };

        Ok(Self {
            spotify,
            catalog_grant,
            completion: CompletionSettings {
                api_url: or_default("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
                api_key: optional("OPENAI_API_KEY"),
                model: or_default("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            },
            likes_url: optional("LIKES_API_URL"),
            user_id: optional("REKO_USER_ID"),
            server_address: server_addr(),
            refresh_interval: Duration::from_millis(parsed(
                "TOKEN_REFRESH_INTERVAL_MS",
                DEFAULT_REFRESH_INTERVAL_MS,
            )),
            search_limit: parsed("SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT),
            data_dir: data_dir(),
        })
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it doesn't exist. A missing `.env` file is not an
/// error: every value can also come from the process environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/reko/.env`
/// - macOS: `~/Library/Application Support/reko/.env`
/// - Windows: `%LOCALAPPDATA%/reko/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or the
/// `.env` file exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e))
}

/// Returns the platform-specific data directory used for `.env` and caches.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("reko");
    path
}

/// Returns the address the local authorization callback server binds to.
///
/// Reads `SERVER_ADDRESS`, e.g. `127.0.0.1:8888`.
pub fn server_addr() -> String {
    or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError(key.to_string()))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    optional(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
