use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Mutex;

use crate::{
    config::{self, Settings},
    error,
    likes::{self, LikesClient},
    management::{
        CredentialManager, GenreSet, PlaybackController, SearchOrchestrator, TrackCollection,
        cache::CachePaths,
    },
    spotify::SpotifyClient,
    types::LikedSong,
    utils, warning,
};

/// Everything a command needs, built once from the environment.
pub struct Context {
    pub settings: Settings,
    pub paths: CachePaths,
    pub client: SpotifyClient,
    pub catalog_credentials: Arc<CredentialManager>,
    pub user_credentials: Arc<CredentialManager>,
}

impl Context {
    /// Reads the settings and restores cached credentials. Exits when a
    /// required variable is missing.
    pub async fn load() -> Self {
        let settings = match Settings::from_env() {
            Ok(settings) => settings,
            Err(e) => error!(
                "{}. Add it to {}",
                e,
                config::data_dir().join(".env").display()
            ),
        };

        Self::new(settings).await
    }

    pub async fn new(settings: Settings) -> Self {
        let paths = CachePaths::new(&settings.data_dir);
        let client = SpotifyClient::new(settings.spotify.api_url.clone());
        let catalog_credentials = Arc::new(CredentialManager::catalog(&settings));
        let user_credentials = Arc::new(CredentialManager::user(&settings));

        catalog_credentials.load_cached().await;
        user_credentials.load_cached().await;

        Self {
            settings,
            paths,
            client,
            catalog_credentials,
            user_credentials,
        }
    }

    pub async fn load_tracks(&self) -> TrackCollection {
        TrackCollection::load(&self.paths.tracks())
            .await
            .unwrap_or_default()
    }

    pub async fn persist_tracks(&self, tracks: &TrackCollection) {
        if let Err(e) = tracks.persist(&self.paths.tracks()).await {
            warning!("Failed to cache tracks: {}", e);
        }
    }

    pub fn orchestrator(
        &self,
        tracks: Arc<Mutex<TrackCollection>>,
        genres: Arc<Mutex<GenreSet>>,
    ) -> SearchOrchestrator {
        SearchOrchestrator::new(
            Arc::clone(&self.catalog_credentials),
            Arc::new(self.client.clone()),
            tracks,
            genres,
        )
    }

    /// Playback controller with the persisted state and a registered device.
    ///
    /// The device comes from `SPOTIFY_DEVICE_ID` when set, otherwise from the
    /// user's device list. Without a user credential no device is registered.
    pub async fn playback(&self) -> PlaybackController {
        let state = PlaybackController::load_state(&self.paths.playback()).await;
        let controller = PlaybackController::with_state(
            Arc::clone(&self.user_credentials),
            Arc::new(self.client.clone()),
            state,
        );

        if let Some(device_id) = self.find_device().await {
            controller.register_device(device_id).await;
        }

        controller
    }

    pub async fn find_device(&self) -> Option<String> {
        if let Some(device_id) = &self.settings.spotify.device_id {
            return Some(device_id.clone());
        }

        self.user_credentials.get_token().await?;
        let client = &self.client;
        match self
            .user_credentials
            .authorized(|token| async move { client.devices(&token).await })
            .await
        {
            Ok(devices) => {
                let device = utils::preferred_device(&devices);
                if device.is_none() {
                    warning!("No Spotify device available. Open Spotify on any device first.");
                }
                device
            }
            Err(e) => {
                warning!("Failed to list devices: {}", e);
                None
            }
        }
    }

    pub async fn persist_playback(&self, controller: &PlaybackController) {
        if let Err(e) = controller.persist_state(&self.paths.playback()).await {
            warning!("Failed to save playback state: {}", e);
        }
    }

    /// Likes client, or `None` when the service is not configured.
    pub fn likes_client(&self) -> Option<LikesClient> {
        match (&self.settings.likes_url, &self.settings.user_id) {
            (Some(url), Some(user_id)) => Some(LikesClient::new(url.clone(), user_id.clone())),
            _ => None,
        }
    }

    pub async fn liked(&self) -> Vec<LikedSong> {
        likes::load_liked(&self.paths.liked_songs()).await
    }

    pub async fn persist_liked(&self, liked: &[LikedSong]) {
        if let Err(e) = likes::persist_liked(&self.paths.liked_songs(), liked).await {
            warning!("Failed to cache liked songs: {}", e);
        }
    }
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
