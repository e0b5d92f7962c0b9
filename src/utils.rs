use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    likes,
    types::{Device, DeviceTableRow, LikedSong, LikedSongTableRow, Track, TrackTableRow},
};

/// `Basic <base64(client_id:client_secret)>` for the token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}

/// Distinct, non-empty artist ids across `tracks`, in first-seen order.
pub fn distinct_artist_ids(tracks: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();
    tracks
        .iter()
        .flat_map(|track| track.artists.iter())
        .filter(|artist| !artist.id.is_empty())
        .filter(|artist| seen.insert(artist.id.as_str()))
        .map(|artist| artist.id.clone())
        .collect()
}

/// Picks the device to play on: the active one, else the first with an id.
pub fn preferred_device(devices: &[Device]) -> Option<String> {
    devices
        .iter()
        .find(|d| d.is_active && d.id.is_some())
        .or_else(|| devices.iter().find(|d| d.id.is_some()))
        .and_then(|d| d.id.clone())
}

pub fn track_table_rows(tracks: &[Track], liked: &[LikedSong]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackTableRow {
            index: i + 1,
            name: track.name.clone(),
            artists: track.artist_names().join(", "),
            album: track.album.name.clone(),
            liked: if likes::is_liked(liked, track) {
                "♥".to_string()
            } else {
                String::new()
            },
        })
        .collect()
}

pub fn liked_song_table_rows(liked: &[LikedSong]) -> Vec<LikedSongTableRow> {
    liked
        .iter()
        .map(|song| LikedSongTableRow {
            name: song.song_name.clone(),
            artists: song.artists.join(", "),
            uri: song
                .track
                .as_ref()
                .map(|t| t.uri.clone())
                .unwrap_or_default(),
        })
        .collect()
}

pub fn device_table_rows(devices: &[Device]) -> Vec<DeviceTableRow> {
    devices
        .iter()
        .map(|device| DeviceTableRow {
            id: device.id.clone().unwrap_or_default(),
            name: device.name.clone(),
            kind: device.kind.clone(),
            active: if device.is_active { "yes" } else { "" }.to_string(),
        })
        .collect()
}
