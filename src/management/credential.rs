use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::Client;
use tokio::{sync::Mutex, task::JoinHandle, time::Instant};

use crate::{
    config::{Grant, Settings, SpotifySettings},
    info,
    management::cache::{self, CachePaths},
    spotify::{ApiError, auth},
    types::{Credential, CredentialSource},
    warning,
};

impl Credential {
    pub fn new(access_token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            access_token: access_token.into(),
            source,
            obtained_at: Utc::now().timestamp() as u64,
            expires_in: None,
        }
    }

    /// Whether the credential is past its advertised lifetime at `now` (unix seconds).
    ///
    /// Credentials without an `expires_in` never expire by time; they are only
    /// replaced by the refresh timer or after a rejected call.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_in
            .is_some_and(|ttl| now >= self.obtained_at.saturating_add(ttl))
    }
}

/// Where the browser has to be sent to authorize the user.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Owns one bearer credential and keeps it usable.
///
/// The credential is obtained lazily from the token endpoint with the
/// configured [`Grant`], or injected with [`CredentialManager::set_token`]
/// after interactive authorization. Renewal happens on a fixed timer
/// ([`CredentialManager::start_auto_refresh`]) and after any rejected call
/// made through [`CredentialManager::authorized`].
///
/// A refresh never fails the caller: when the token endpoint is unreachable or
/// rejects the grant, the previous credential stays in place.
pub struct CredentialManager {
    http: Client,
    token_url: String,
    auth_url: String,
    redirect_uri: String,
    client_id: String,
    client_secret: String,
    grant: Grant,
    token_timeout: Duration,
    credential: Mutex<Option<Credential>>,
    cache_path: Option<PathBuf>,
}

impl CredentialManager {
    pub fn new(spotify: &SpotifySettings, grant: Grant) -> Self {
        Self {
            http: Client::new(),
            token_url: spotify.token_url.clone(),
            auth_url: spotify.auth_url.clone(),
            redirect_uri: spotify.redirect_uri.clone(),
            client_id: spotify.client_id.clone(),
            client_secret: spotify.client_secret.clone(),
            grant,
            token_timeout: auth::TOKEN_REQUEST_TIMEOUT,
            credential: Mutex::new(None),
            cache_path: None,
        }
    }

    /// Manager for catalog calls (search, artists), backed by the configured grant.
    pub fn catalog(settings: &Settings) -> Self {
        Self::new(&settings.spotify, settings.catalog_grant.clone())
            .with_cache(CachePaths::new(&settings.data_dir).catalog_token())
    }

    /// Manager for user calls (playback, playlists).
    ///
    /// A configured static refresh token doubles as the user's grant; without
    /// one the credential can only come from interactive authorization.
    pub fn user(settings: &Settings) -> Self {
        let grant = match &settings.catalog_grant {
            Grant::RefreshToken(token) => Grant::RefreshToken(token.clone()),
            _ => Grant::Interactive,
        };

        Self::new(&settings.spotify, grant)
            .with_cache(CachePaths::new(&settings.data_dir).user_token())
    }

    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Bounds each token request. The credential stays locked while one is
    /// in flight.
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }

    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    pub fn source(&self) -> CredentialSource {
        match self.grant {
            Grant::ClientCredentials => CredentialSource::ClientCredentials,
            Grant::RefreshToken(_) | Grant::Interactive => CredentialSource::UserAuthorization,
        }
    }

    /// Restores a persisted credential unless it has already expired.
    ///
    /// Returns `true` when a usable credential was loaded.
    pub async fn load_cached(&self) -> bool {
        let Some(path) = &self.cache_path else {
            return false;
        };

        let credential: Credential = match cache::read_json(path).await {
            Ok(credential) => credential,
            Err(_) => return false,
        };

        if credential.access_token.is_empty()
            || credential.is_expired_at(Utc::now().timestamp() as u64)
        {
            return false;
        }

        *self.credential.lock().await = Some(credential);
        true
    }

    /// Returns the cached credential without touching the network.
    pub async fn current(&self) -> Option<Credential> {
        self.credential.lock().await.clone()
    }

    /// Returns the cached credential, refreshing first when none is held.
    ///
    /// The slot stays locked while the token endpoint is called, so concurrent
    /// callers wait for one refresh instead of issuing their own.
    pub async fn get_token(&self) -> Option<Credential> {
        let mut slot = self.credential.lock().await;
        if slot.is_none() {
            self.renew(&mut slot).await;
        }
        slot.clone()
    }

    /// Requests a new credential with the configured grant.
    ///
    /// On success the new credential replaces the cached one and is persisted.
    /// On failure a warning is logged and the previous, possibly stale,
    /// credential is returned untouched.
    pub async fn refresh(&self) -> Option<Credential> {
        let mut slot = self.credential.lock().await;
        self.renew(&mut slot).await;
        slot.clone()
    }

    /// Injects a credential obtained outside the token endpoint, e.g. from the
    /// authorization callback.
    pub async fn set_token(&self, credential: Credential) {
        self.persist(&credential).await;
        *self.credential.lock().await = Some(credential);
    }

    /// Drops the cached credential and its persisted copy. A running
    /// auto-refresh stops at its next tick.
    pub async fn clear(&self) {
        *self.credential.lock().await = None;
        if let Some(path) = &self.cache_path {
            if let Err(e) = cache::remove(path).await {
                warning!("Failed to remove cached credential: {}", e);
            }
        }
    }

    /// Runs a bearer-authorized call, refreshing and retrying it once when rejected.
    ///
    /// The retry only happens when the refresh produced a different credential;
    /// if the token endpoint failed too, the original rejection is returned.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotAuthorized`] when no credential can be obtained at all
    /// - whatever the call (or its single retry) returned
    pub async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, ApiError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(credential) = self.get_token().await else {
            return Err(ApiError::NotAuthorized);
        };

        match call(credential.access_token.clone()).await {
            Err(e) if e.is_auth_expired() => {
                warning!("{}, refreshing access token", e);
                match self.refresh_after_rejection(&credential).await {
                    Some(renewed) => call(renewed.access_token).await,
                    None => Err(e),
                }
            }
            other => other,
        }
    }

    /// Refreshes `self` every `interval` for as long as a credential is held.
    ///
    /// The timer stops when the credential is cleared or when the returned
    /// guard is dropped.
    pub fn start_auto_refresh(self: &Arc<Self>, interval: Duration) -> AutoRefresh {
        let interval = interval.max(Duration::from_millis(1));
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                ticker.tick().await;
                if !manager.refresh_held().await {
                    break;
                }
            }
        });

        AutoRefresh { handle }
    }

    /// Builds the implicit-grant authorize URL for a fresh random `state`.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest, String> {
        let state: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        let url = auth::authorize_url(&self.auth_url, &self.client_id, &self.redirect_uri, &state)?;
        Ok(AuthorizationRequest { url, state })
    }

    /// Sends the user's browser to the authorize endpoint.
    ///
    /// The token arrives later through the callback server and is injected
    /// with [`CredentialManager::set_token`].
    pub fn authorize_interactive(&self) -> Result<AuthorizationRequest, String> {
        let request = self.authorization_request()?;
        if webbrowser::open(&request.url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                request.url
            );
        }
        Ok(request)
    }

    /// Renews only while a credential is held; `false` once the slot is empty.
    async fn refresh_held(&self) -> bool {
        let mut slot = self.credential.lock().await;
        if slot.is_none() {
            return false;
        }
        self.renew(&mut slot).await;
        true
    }

    async fn refresh_after_rejection(&self, stale: &Credential) -> Option<Credential> {
        let mut slot = self.credential.lock().await;

        // Another caller already replaced the rejected token.
        if let Some(current) = slot.as_ref() {
            if current.access_token != stale.access_token {
                return Some(current.clone());
            }
        }

        if self.renew(&mut slot).await {
            slot.clone()
        } else {
            None
        }
    }

    async fn renew(&self, slot: &mut Option<Credential>) -> bool {
        match self.request().await {
            Ok(credential) => {
                self.persist(&credential).await;
                *slot = Some(credential);
                info!("Access token refreshed");
                true
            }
            Err(ApiError::NotAuthorized) => {
                warning!("Spotify authorization required, run `reko auth` first");
                false
            }
            Err(e) => {
                warning!("Failed to refresh access token: {}", e);
                false
            }
        }
    }

    async fn request(&self) -> Result<Credential, ApiError> {
        let form: Vec<(&str, &str)> = match &self.grant {
            Grant::ClientCredentials => vec![("grant_type", "client_credentials")],
            Grant::RefreshToken(token) => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", token.as_str()),
            ],
            Grant::Interactive => return Err(ApiError::NotAuthorized),
        };

        let response = auth::request_token(
            &self.http,
            &self.token_url,
            &self.client_id,
            &self.client_secret,
            &form,
            self.token_timeout,
        )
        .await?;

        let access_token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Malformed("token response without access_token".into()))?;

        Ok(Credential {
            access_token,
            source: self.source(),
            obtained_at: Utc::now().timestamp() as u64,
            expires_in: response.expires_in,
        })
    }

    async fn persist(&self, credential: &Credential) {
        if let Some(path) = &self.cache_path {
            if let Err(e) = cache::write_json(path, credential).await {
                warning!("Failed to cache access token: {}", e);
            }
        }
    }
}

/// Guard for the background refresh timer. Dropping it cancels the timer.
pub struct AutoRefresh {
    handle: JoinHandle<()>,
}

impl AutoRefresh {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
