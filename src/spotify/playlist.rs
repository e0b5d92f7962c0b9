use crate::{
    spotify::{ApiError, SpotifyClient, decode, send_authorized},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse,
    },
};

/// Spotify accepts at most this many URIs per add-tracks call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

impl SpotifyClient {
    /// Creates an empty playlist owned by `user_id`.
    ///
    /// The playlist is never collaborative; visibility follows `public`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] when the user credential lacks the
    /// `playlist-modify-*` scopes or has expired.
    pub async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatePlaylistResponse, ApiError> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        };

        let request = self
            .http()
            .post(self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body)
            .bearer_auth(token);

        let response = send_authorized(request).await?;
        decode(response).await
    }

    /// Appends up to [`MAX_TRACKS_PER_REQUEST`] track URIs to a playlist.
    pub async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ApiError> {
        let request = self
            .http()
            .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .json(&AddTrackToPlaylistRequest {
                uris: uris.to_vec(),
            })
            .bearer_auth(token);

        let response = send_authorized(request).await?;
        decode(response).await
    }
}
