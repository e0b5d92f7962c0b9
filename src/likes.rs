//! Client for the liked-songs persistence service.
//!
//! The service owns the toggle: posting a song that is already liked removes
//! it, posting any other song adds it. Either way the full, updated list for
//! the user comes back.

use std::path::Path;

use reqwest::Client;

use crate::{
    management::cache::{self, CacheError},
    spotify::{ApiError, decode},
    types::{LikeResponse, LikedSong, Track},
};

#[derive(Debug, Clone)]
pub struct LikesClient {
    http: Client,
    base_url: String,
    user_id: String,
}

impl LikesClient {
    pub fn new(base_url: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
        }
    }

    /// Likes `track`, or unlikes it when it is already liked.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] when the service answers with a non-success status
    /// - [`ApiError::Malformed`] when the body has no `likedSongs` list
    pub async fn toggle(&self, track: &Track) -> Result<Vec<LikedSong>, ApiError> {
        let body = LikedSong {
            user_id: self.user_id.clone(),
            artists: track.artist_names(),
            song_name: track.name.clone(),
            track: Some(track.clone()),
        };

        let response = self
            .http
            .post(format!("{}/likedSongs", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body: LikeResponse = decode(response).await?;
        body.liked_songs
            .ok_or_else(|| ApiError::Malformed("response without likedSongs".into()))
    }
}

pub fn is_liked(liked: &[LikedSong], track: &Track) -> bool {
    let key = track.key();
    liked.iter().any(|song| song.key() == key)
}

/// Distinct artist names across all liked songs, in first-seen order.
pub fn liked_artists(liked: &[LikedSong]) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();
    for artist in liked.iter().flat_map(|song| song.artists.iter()) {
        if !artists.contains(artist) {
            artists.push(artist.clone());
        }
    }
    artists
}

pub async fn load_liked(path: &Path) -> Vec<LikedSong> {
    cache::read_json(path).await.unwrap_or_default()
}

pub async fn persist_liked(path: &Path, liked: &[LikedSong]) -> Result<(), CacheError> {
    cache::write_json(path, liked).await
}
