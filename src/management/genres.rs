use std::fmt;

use crate::types::ArtistGenres;

/// Distinct genres of one search batch, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSet {
    genres: Vec<String>,
}

impl GenreSet {
    /// Flattens the genre lists of all looked-up artists, dropping duplicates.
    pub fn from_artists(artists: &[ArtistGenres]) -> Self {
        let mut set = Self::default();
        for genre in artists.iter().flat_map(|a| a.genres.iter()) {
            set.insert(genre);
        }
        set
    }

    pub fn insert(&mut self, genre: &str) {
        if !genre.is_empty() && !self.genres.iter().any(|g| g == genre) {
            self.genres.push(genre.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// The comma-joined form handed to downstream consumers, e.g. `chill, lofi`.
    pub fn descriptor(&self) -> String {
        self.genres.join(", ")
    }
}

impl fmt::Display for GenreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}
