use std::{path::Path, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    management::{
        CredentialManager,
        cache::{self, CacheError},
    },
    spotify::{ApiError, Player},
    types::{PlaybackState, Track},
    warning,
};

/// Result of one [`PlaybackController::activate`] call.
#[derive(Debug)]
pub enum PlaybackOutcome {
    Started(String),
    Paused(String),
    /// No device is registered or no user credential is available.
    AuthorizationRequired,
    /// The remote call failed; the state was left as it was.
    Failed(ApiError),
}

/// Single-track playback toggle on one registered device.
///
/// Activating the track that is currently playing pauses it; activating
/// anything else (a different track, or the paused one) starts it. The
/// previously playing track is never stopped explicitly, starting a new one
/// replaces it on the device.
pub struct PlaybackController {
    credentials: Arc<CredentialManager>,
    player: Arc<dyn Player>,
    device: Mutex<Option<String>>,
    state: Mutex<PlaybackState>,
}

impl PlaybackController {
    pub fn new(credentials: Arc<CredentialManager>, player: Arc<dyn Player>) -> Self {
        Self::with_state(credentials, player, PlaybackState::Idle)
    }

    pub fn with_state(
        credentials: Arc<CredentialManager>,
        player: Arc<dyn Player>,
        state: PlaybackState,
    ) -> Self {
        Self {
            credentials,
            player,
            device: Mutex::new(None),
            state: Mutex::new(state),
        }
    }

    pub async fn register_device(&self, device_id: impl Into<String>) {
        *self.device.lock().await = Some(device_id.into());
    }

    pub async fn device(&self) -> Option<String> {
        self.device.lock().await.clone()
    }

    pub async fn state(&self) -> PlaybackState {
        self.state.lock().await.clone()
    }

    /// Restores the state saved by a previous invocation. A missing or
    /// unreadable file yields `Idle`.
    pub async fn load_state(path: &Path) -> PlaybackState {
        cache::read_json(path).await.unwrap_or_default()
    }

    pub async fn persist_state(&self, path: &Path) -> Result<(), CacheError> {
        let state = self.state().await;
        cache::write_json(path, &state).await
    }

    /// Toggles playback for `track`.
    ///
    /// The state is read when the call starts and replaced only after the
    /// remote command succeeded. Two overlapping calls both issue their
    /// command and whichever finishes last decides the state.
    pub async fn activate(&self, track: &Track) -> PlaybackOutcome {
        let Some(device_id) = self.device().await else {
            return PlaybackOutcome::AuthorizationRequired;
        };

        let uri = track.uri.clone();
        let pause = matches!(&*self.state.lock().await, PlaybackState::Playing(active) if *active == uri);

        let player = self.player.as_ref();
        let device = device_id.as_str();
        let result = if pause {
            self.credentials
                .authorized(|token| async move { player.pause(&token, device).await })
                .await
        } else {
            let target = uri.as_str();
            self.credentials
                .authorized(|token| async move { player.play(&token, device, target).await })
                .await
        };

        match result {
            Ok(()) => {
                let next = if pause {
                    PlaybackState::Paused(uri.clone())
                } else {
                    PlaybackState::Playing(uri.clone())
                };
                *self.state.lock().await = next;

                if pause {
                    PlaybackOutcome::Paused(uri)
                } else {
                    PlaybackOutcome::Started(uri)
                }
            }
            Err(ApiError::NotAuthorized) => PlaybackOutcome::AuthorizationRequired,
            Err(e) => {
                warning!("Playback command for {} failed: {}", uri, e);
                PlaybackOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Grant, SpotifySettings},
        spotify::MockPlayer,
        types::{Credential, CredentialSource},
    };
    use mockall::{Sequence, predicate::*};
    use reqwest::StatusCode;

    fn settings() -> SpotifySettings {
        SpotifySettings {
            client_id: "id".into(),
            client_secret: "secret".into(),
            api_url: "http://127.0.0.1:9".into(),
            token_url: "http://127.0.0.1:9/api/token".into(),
            auth_url: "http://127.0.0.1:9/authorize".into(),
            redirect_uri: "http://127.0.0.1:9/callback".into(),
            user_id: None,
            device_id: None,
        }
    }

    async fn authorized_user() -> Arc<CredentialManager> {
        let manager = CredentialManager::new(&settings(), Grant::Interactive);
        manager
            .set_token(Credential::new("user-token", CredentialSource::UserAuthorization))
            .await;
        Arc::new(manager)
    }

    fn track(uri: &str) -> Track {
        Track {
            name: uri.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    async fn controller(player: MockPlayer) -> PlaybackController {
        let controller = PlaybackController::new(authorized_user().await, Arc::new(player));
        controller.register_device("device-1").await;
        controller
    }

    #[tokio::test]
    async fn same_track_toggles_between_playing_and_paused() {
        let mut player = MockPlayer::new();
        let mut seq = Sequence::new();
        player
            .expect_play()
            .with(eq("user-token"), eq("device-1"), eq("spotify:track:x"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        player
            .expect_pause()
            .with(eq("user-token"), eq("device-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        player
            .expect_play()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let controller = controller(player).await;
        let x = track("spotify:track:x");

        controller.activate(&x).await;
        assert_eq!(controller.state().await, PlaybackState::Playing(x.uri.clone()));
        controller.activate(&x).await;
        assert_eq!(controller.state().await, PlaybackState::Paused(x.uri.clone()));
        controller.activate(&x).await;
        assert_eq!(controller.state().await, PlaybackState::Playing(x.uri.clone()));
    }

    #[tokio::test]
    async fn switching_tracks_never_pauses_the_previous_one() {
        let mut player = MockPlayer::new();
        player.expect_play().times(2).returning(|_, _, _| Ok(()));
        player.expect_pause().times(0);

        let controller = controller(player).await;
        controller.activate(&track("spotify:track:a")).await;
        let outcome = controller.activate(&track("spotify:track:b")).await;

        assert!(matches!(outcome, PlaybackOutcome::Started(uri) if uri == "spotify:track:b"));
        assert_eq!(
            controller.state().await,
            PlaybackState::Playing("spotify:track:b".into())
        );
    }

    #[tokio::test]
    async fn missing_device_requires_authorization() {
        let mut player = MockPlayer::new();
        player.expect_play().times(0);

        let controller = PlaybackController::new(authorized_user().await, Arc::new(player));
        let outcome = controller.activate(&track("spotify:track:a")).await;

        assert!(matches!(outcome, PlaybackOutcome::AuthorizationRequired));
        assert_eq!(controller.state().await, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn missing_user_credential_requires_authorization() {
        let mut player = MockPlayer::new();
        player.expect_play().times(0);

        let credentials = Arc::new(CredentialManager::new(&settings(), Grant::Interactive));
        let controller = PlaybackController::new(credentials, Arc::new(player));
        controller.register_device("device-1").await;

        let outcome = controller.activate(&track("spotify:track:a")).await;
        assert!(matches!(outcome, PlaybackOutcome::AuthorizationRequired));
    }

    #[tokio::test]
    async fn failed_command_keeps_previous_state() {
        let mut player = MockPlayer::new();
        player
            .expect_play()
            .returning(|_, _, _| Err(ApiError::AuthExpired(StatusCode::BAD_GATEWAY)));

        let credentials = authorized_user().await;
        let controller = PlaybackController::with_state(
            credentials,
            Arc::new(player),
            PlaybackState::Paused("spotify:track:a".into()),
        );
        controller.register_device("device-1").await;

        let outcome = controller.activate(&track("spotify:track:b")).await;

        assert!(matches!(outcome, PlaybackOutcome::Failed(_)));
        assert_eq!(
            controller.state().await,
            PlaybackState::Paused("spotify:track:a".into())
        );
    }
}
