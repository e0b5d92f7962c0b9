use async_trait::async_trait;

use crate::{
    spotify::{ApiError, Catalog, SpotifyClient, decode, send_authorized},
    types::{ArtistGenres, SearchResponse, SeveralArtistsResponse, Track},
};

impl SpotifyClient {
    /// Searches the catalog for tracks matching a free-text query.
    ///
    /// Issues `GET /search?q=<query>&type=track&limit=<limit>`. A response
    /// without a `tracks` object is treated as an empty result rather than an
    /// error, since the endpoint omits it when nothing matched.
    ///
    /// # Arguments
    ///
    /// * `token` - Bearer token of the catalog credential
    /// * `query` - One suggestion line, e.g. `Song A - Artist1`
    /// * `limit` - Maximum number of tracks to return
    ///
    /// # Errors
    ///
    /// - [`ApiError::AuthExpired`] for any non-success status
    /// - [`ApiError::Malformed`] when the body is not valid JSON
    /// - [`ApiError::Network`] when no response arrived
    ///
    /// # Example
    ///
    /// ```
    /// let client = SpotifyClient::new("https://api.spotify.com/v1");
    /// let tracks = client.search(&token, "lofi beats", 1).await?;
    /// ```
    pub async fn search(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, ApiError> {
        let limit = limit.to_string();
        let request = self
            .http()
            .get(self.url("/search"))
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .bearer_auth(token);

        let response = send_authorized(request).await?;
        let body: SearchResponse = decode(response).await?;

        Ok(body.tracks.map(|page| page.items).unwrap_or_default())
    }

    /// Looks up several artists in one request and returns their genres.
    ///
    /// Unknown ids come back as `null` entries and are skipped. A body without
    /// an `artists` array yields an empty list.
    pub async fn several_artists(
        &self,
        token: &str,
        artist_ids: &[String],
    ) -> Result<Vec<ArtistGenres>, ApiError> {
        let request = self
            .http()
            .get(self.url("/artists"))
            .query(&[("ids", artist_ids.join(","))])
            .bearer_auth(token);

        let response = send_authorized(request).await?;
        let body: SeveralArtistsResponse = decode(response).await?;

        Ok(body
            .artists
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect())
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, ApiError> {
        self.search(token, query, limit).await
    }

    async fn artist_genres(
        &self,
        token: &str,
        artist_ids: &[String],
    ) -> Result<Vec<ArtistGenres>, ApiError> {
        self.several_artists(token, artist_ids).await
    }
}
