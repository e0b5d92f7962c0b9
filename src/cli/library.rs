use tabled::Table;

use crate::{
    cli::{Context, context::spinner},
    error, info,
    likes::{self, LikesClient},
    management::{self, TrackCollection},
    success,
    types::Track,
    utils, warning,
};

pub async fn tracks(clear: bool) {
    let ctx = Context::load().await;
    let mut tracks = ctx.load_tracks().await;

    if clear {
        tracks.clear();
        ctx.persist_tracks(&tracks).await;
        success!("Track list cleared");
        return;
    }

    if tracks.is_empty() {
        info!("No tracks yet. Run `reko recommend <mood>` first.");
        return;
    }

    let liked = ctx.liked().await;
    println!("{}", Table::new(utils::track_table_rows(tracks.all(), &liked)));
}

pub async fn like(position: usize) {
    let ctx = Context::load().await;
    let Some(client) = ctx.likes_client() else {
        error!("LIKES_API_URL and REKO_USER_ID must be set to like songs");
    };

    let tracks = ctx.load_tracks().await;
    let Some(track) = track_at(&tracks, position) else {
        error!("No track at position {}", position);
    };

    toggle_like(&ctx, &client, &track).await;
}

pub(crate) fn track_at(tracks: &TrackCollection, position: usize) -> Option<Track> {
    tracks.get(position).cloned()
}

pub(crate) async fn toggle_like(ctx: &Context, client: &LikesClient, track: &Track) {
    let was_liked = likes::is_liked(&ctx.liked().await, track);

    match client.toggle(track).await {
        Ok(liked) => {
            ctx.persist_liked(&liked).await;
            if likes::is_liked(&liked, track) {
                success!("Liked {} - {}", track.name, track.artist_names().join(", "));
            } else if was_liked {
                success!("Removed {} from liked songs", track.name);
            } else {
                warning!("{} is not in the liked songs returned by the service", track.name);
            }
        }
        Err(e) => warning!("Failed to toggle like for {}: {}", track.name, e),
    }
}

pub async fn likes() {
    let ctx = Context::load().await;
    let liked = ctx.liked().await;

    if liked.is_empty() {
        info!("No liked songs yet. Run `reko like <n>` to like a track.");
        return;
    }

    println!("{}", Table::new(utils::liked_song_table_rows(&liked)));
}

pub async fn export(name: Option<String>) {
    let ctx = Context::load().await;
    let Some(user_id) = ctx.settings.spotify.user_id.clone() else {
        error!("SPOTIFY_USER_ID must be set to export playlists");
    };

    if ctx.user_credentials.get_token().await.is_none() {
        error!("Spotify authorization required. Run `reko auth` first.");
    }

    let liked = ctx.liked().await;
    let uris = management::export_uris(&liked);
    if uris.is_empty() {
        warning!("No liked songs with a Spotify URI to export");
        return;
    }

    let name = name.unwrap_or_else(|| "reko likes".to_string());
    let pb = spinner(format!("Exporting {} tracks to '{}'...", uris.len(), name));
    let result =
        management::export_playlist(&ctx.user_credentials, &ctx.client, &user_id, &name, &uris)
            .await;
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            if report.failed_chunks > 0 {
                warning!("{} chunks could not be added", report.failed_chunks);
            }
            success!(
                "Playlist '{}' created with {} tracks (id {})",
                name,
                report.added,
                report.playlist_id
            );
        }
        Err(e) => error!("Failed to create playlist: {}", e),
    }
}
