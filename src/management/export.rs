use crate::{
    management::CredentialManager,
    spotify::{ApiError, SpotifyClient, playlist::MAX_TRACKS_PER_REQUEST},
    types::LikedSong,
    warning,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub playlist_id: String,
    pub added: usize,
    pub failed_chunks: usize,
}

/// Catalog URIs of the liked songs, in list order, without duplicates.
///
/// Songs liked before a URI was known cannot be added to a playlist and are skipped.
pub fn export_uris(liked: &[LikedSong]) -> Vec<String> {
    let mut uris: Vec<String> = Vec::new();
    for uri in liked
        .iter()
        .filter_map(|song| song.track.as_ref())
        .map(|track| track.uri.as_str())
        .filter(|uri| !uri.is_empty())
    {
        if !uris.iter().any(|u| u == uri) {
            uris.push(uri.to_string());
        }
    }
    uris
}

/// Creates a private playlist for `user_id` and fills it with `uris`.
///
/// Tracks are added in chunks of [`MAX_TRACKS_PER_REQUEST`]. A failed chunk is
/// logged and skipped; the remaining chunks are still sent.
///
/// # Errors
///
/// Returns the error of the create call. Nothing is added in that case.
pub async fn export_playlist(
    credentials: &CredentialManager,
    client: &SpotifyClient,
    user_id: &str,
    name: &str,
    uris: &[String],
) -> Result<ExportReport, ApiError> {
    let description = format!("{} tracks liked in reko", uris.len());
    let created = credentials
        .authorized(|token| {
            let description = description.as_str();
            async move {
                client
                    .create_playlist(&token, user_id, name, description, false)
                    .await
            }
        })
        .await?;

    let mut report = ExportReport {
        playlist_id: created.id,
        ..Default::default()
    };

    for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        let playlist_id = report.playlist_id.as_str();
        match credentials
            .authorized(|token| async move { client.add_tracks(&token, playlist_id, chunk).await })
            .await
        {
            Ok(_) => report.added += chunk.len(),
            Err(e) => {
                warning!("Failed to add tracks to playlist: {}", e);
                report.failed_chunks += 1;
            }
        }
    }

    Ok(report)
}
