use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialSource {
    ClientCredentials,
    UserAuthorization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub source: CredentialSource,
    pub obtained_at: u64,
    pub expires_in: Option<u64>,
}

/// Authorization in flight: the `state` sent to the authorize endpoint and,
/// once the callback fired, the credential it delivered.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub state: String,
    pub credential: Option<Credential>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Album {
    pub name: String,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: Album,
    pub uri: String,
    pub preview_url: Option<String>,
}

/// Key used to decide whether two tracks are "the same" for liking and playing.
///
/// The catalog URI wins whenever it is present. Tracks without one fall back to
/// the serialized artist names plus the track name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackKey {
    Uri(String),
    NameAndArtists { artists: String, name: String },
}

impl Track {
    pub fn key(&self) -> TrackKey {
        if self.uri.is_empty() {
            TrackKey::NameAndArtists {
                artists: self.artist_names().join(","),
                name: self.name.clone(),
            }
        } else {
            TrackKey::Uri(self.uri.clone())
        }
    }

    pub fn artist_names(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackPage {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeveralArtistsResponse {
    pub artists: Option<Vec<Option<ArtistGenres>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistGenres {
    pub id: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DevicesResponse {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletionChoice {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikedSong {
    pub user_id: String,
    pub artists: Vec<String>,
    #[serde(rename = "songName")]
    pub song_name: String,
    #[serde(default)]
    pub track: Option<Track>,
}

impl LikedSong {
    pub fn key(&self) -> TrackKey {
        match &self.track {
            Some(track) => track.key(),
            None => TrackKey::NameAndArtists {
                artists: self.artists.join(","),
                name: self.song_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LikeResponse {
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(rename = "likedSongs")]
    pub liked_songs: Option<Vec<LikedSong>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing(String),
    Paused(String),
}

impl PlaybackState {
    pub fn active_uri(&self) -> Option<&str> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Playing(uri) | PlaybackState::Paused(uri) => Some(uri),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing(_))
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub artists: String,
    pub album: String,
    #[tabled(rename = "liked")]
    pub liked: String,
}

#[derive(Tabled)]
pub struct LikedSongTableRow {
    pub name: String,
    pub artists: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct DeviceTableRow {
    pub id: String,
    pub name: String,
    #[tabled(rename = "type")]
    pub kind: String,
    pub active: String,
}
