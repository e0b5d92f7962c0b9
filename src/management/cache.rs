use std::{
    fmt,
    io::Error,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug)]
pub enum CacheError {
    IoError(Error),
    SerdeError(serde_json::Error),
}

impl From<Error> for CacheError {
    fn from(err: Error) -> Self {
        CacheError::IoError(err)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::SerdeError(err)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::IoError(e) => write!(f, "cache I/O failed: {}", e),
            CacheError::SerdeError(e) => write!(f, "cache content is invalid: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Locations of the JSON caches under the data directory.
#[derive(Debug, Clone)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn catalog_token(&self) -> PathBuf {
        self.root.join("cache/catalog-token.json")
    }

    pub fn user_token(&self) -> PathBuf {
        self.root.join("cache/user-token.json")
    }

    pub fn tracks(&self) -> PathBuf {
        self.root.join("cache/tracks.json")
    }

    pub fn liked_songs(&self) -> PathBuf {
        self.root.join("cache/liked-songs.json")
    }

    pub fn playback(&self) -> PathBuf {
        self.root.join("state/playback.json")
    }
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CacheError> {
    let content = async_fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes `value` as pretty JSON, creating parent directories as needed.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(value)?;
    async_fs::write(path, json).await?;
    Ok(())
}

pub async fn remove(path: &Path) -> Result<(), CacheError> {
    match async_fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::IoError(e)),
    }
}
