use std::path::Path;

use crate::{
    management::cache::{self, CacheError},
    types::Track,
};

/// Ordered, append-only list of every track resolved so far.
///
/// Nothing is ever deduplicated here; showing a track twice is the caller's
/// concern.
#[derive(Debug, Clone, Default)]
pub struct TrackCollection {
    tracks: Vec<Track>,
}

impl TrackCollection {
    pub async fn load(path: &Path) -> Result<Self, CacheError> {
        let tracks: Vec<Track> = cache::read_json(path).await?;
        Ok(Self { tracks })
    }

    pub async fn persist(&self, path: &Path) -> Result<(), CacheError> {
        cache::write_json(path, &self.tracks).await
    }

    /// Appends a batch at the end, keeping its order. Returns the number appended.
    pub fn append(&mut self, tracks: Vec<Track>) -> usize {
        let count = tracks.len();
        self.tracks.extend(tracks);
        count
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Looks up a track by its 1-based position as shown in tables.
    pub fn get(&self, position: usize) -> Option<&Track> {
        position.checked_sub(1).and_then(|i| self.tracks.get(i))
    }

    pub fn all(&self) -> &[Track] {
        &self.tracks
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
