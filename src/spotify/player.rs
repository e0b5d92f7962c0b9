use async_trait::async_trait;

use crate::{
    spotify::{ApiError, Player, SpotifyClient, decode, send_authorized},
    types::{Device, DevicesResponse, PlayRequest},
};

impl SpotifyClient {
    /// Lists the Spotify Connect devices visible to the authorized user.
    pub async fn devices(&self, token: &str) -> Result<Vec<Device>, ApiError> {
        let request = self
            .http()
            .get(self.url("/me/player/devices"))
            .bearer_auth(token);

        let response = send_authorized(request).await?;
        let body: DevicesResponse = decode(response).await?;
        Ok(body.devices)
    }

    /// Starts playback of a single track on the given device.
    ///
    /// Issues `PUT /me/player/play?device_id=<id>` with `{"uris": [uri]}`.
    /// Spotify answers `204 No Content` on success, so the body is ignored.
    pub async fn start_playback(
        &self,
        token: &str,
        device_id: &str,
        uri: &str,
    ) -> Result<(), ApiError> {
        let request = self
            .http()
            .put(self.url("/me/player/play"))
            .query(&[("device_id", device_id)])
            .json(&PlayRequest {
                uris: vec![uri.to_string()],
            })
            .bearer_auth(token);

        send_authorized(request).await?;
        Ok(())
    }

    pub async fn pause_playback(&self, token: &str, device_id: &str) -> Result<(), ApiError> {
        let request = self
            .http()
            .put(self.url("/me/player/pause"))
            .query(&[("device_id", device_id)])
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .bearer_auth(token);

        send_authorized(request).await?;
        Ok(())
    }
}

#[async_trait]
impl Player for SpotifyClient {
    async fn play(&self, token: &str, device_id: &str, uri: &str) -> Result<(), ApiError> {
        self.start_playback(token, device_id, uri).await
    }

    async fn pause(&self, token: &str, device_id: &str) -> Result<(), ApiError> {
        self.pause_playback(token, device_id).await
    }
}
