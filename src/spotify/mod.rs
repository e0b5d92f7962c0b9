//! # Spotify Integration Module
//!
//! HTTP client for the parts of the Spotify Web API reko talks to. The module
//! only knows how to shape requests and decode responses. Token lifecycle and
//! the refresh-then-retry contract live in [`crate::management`].
//!
//! ## Architecture
//!
//! ```text
//! CLI / Session
//!          ↓
//! Management (CredentialManager, SearchOrchestrator, PlaybackController)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (token endpoint, authorize redirect)
//!     ├── Search (track search, several-artists lookup)
//!     ├── Player (devices, play, pause)
//!     └── Playlist (create, add tracks)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Seams
//!
//! The search orchestrator and the playback controller do not depend on
//! [`SpotifyClient`] directly. They hold a [`Catalog`] or a [`Player`] trait
//! object so that tests can substitute mocks.
//!
//! ## Error Types
//!
//! Every call returns [`ApiError`]:
//! - **`AuthExpired`** - any non-success status on a bearer-authorized call
//! - **`Status`** - non-success status on an unauthenticated call
//! - **`Malformed`** - the body could not be decoded
//! - **`Network`** - the request never produced a response
//! - **`NotAuthorized`** - no credential is available for the call
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials and refresh-token grants
//! - `GET /search` - track search
//! - `GET /artists` - several artists (genres)
//! - `GET /me/player/devices` - available playback devices
//! - `PUT /me/player/play`, `PUT /me/player/pause` - device-scoped playback
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    types::{ArtistGenres, Track},
    warning,
};

pub mod auth;
pub mod player;
pub mod playlist;
pub mod search;

/// Longest `Retry-After` the client is willing to sleep through before giving up.
const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug)]
pub enum ApiError {
    AuthExpired(StatusCode),
    Status(StatusCode),
    Malformed(String),
    Network(reqwest::Error),
    /// No credential could be obtained, the user has to authorize first.
    NotAuthorized,
}

impl ApiError {
    /// Whether the failure should trigger a credential refresh followed by one retry.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthExpired(status) => {
                write!(f, "request rejected with status {}", status)
            }
            ApiError::Status(status) => write!(f, "request failed with status {}", status),
            ApiError::Malformed(reason) => write!(f, "malformed response: {}", reason),
            ApiError::Network(err) => write!(f, "network failure: {}", err),
            ApiError::NotAuthorized => write!(f, "no credential available, authorization required"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err)
    }
}

/// Track search and artist enrichment, as used by the search orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, ApiError>;

    async fn artist_genres(
        &self,
        token: &str,
        artist_ids: &[String],
    ) -> Result<Vec<ArtistGenres>, ApiError>;
}

/// Device-scoped playback commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Player: Send + Sync {
    async fn play(&self, token: &str, device_id: &str, uri: &str) -> Result<(), ApiError>;

    async fn pause(&self, token: &str, device_id: &str) -> Result<(), ApiError>;
}

/// Thin wrapper around a shared `reqwest::Client` and the Web API base URL.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), api_url)
    }

    pub fn with_http(http: Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

/// Sends a bearer-authorized request, honouring one short `Retry-After` on 429.
///
/// Any other non-success status maps to [`ApiError::AuthExpired`] so callers
/// refresh their credential and retry once.
pub(crate) async fn send_authorized(request: RequestBuilder) -> Result<Response, ApiError> {
    let retry = request.try_clone();
    let response = request.send().await?;

    if response.status() == StatusCode::TOO_MANY_REQUESTS {
        if let (Some(wait), Some(retry)) = (retry_after(&response), retry) {
            if wait <= MAX_RETRY_AFTER_SECS {
                sleep(Duration::from_secs(wait)).await;
                return check_authorized(retry.send().await?);
            }
            warning!("Spotify asked to retry after {} seconds, giving up", wait);
        }
    }

    check_authorized(response)
}

fn check_authorized(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::AuthExpired(status))
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Reads the whole body and decodes it, mapping decode failures to [`ApiError::Malformed`].
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}
