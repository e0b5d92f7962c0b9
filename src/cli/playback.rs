use std::sync::Arc;

use tabled::Table;

use crate::{
    cli::{Context, library::track_at},
    error, info,
    management::{PlaybackController, PlaybackOutcome},
    spotify, success,
    types::Track,
    utils, warning,
};

pub async fn play(position: usize) {
    let ctx = Context::load().await;
    let tracks = ctx.load_tracks().await;
    let Some(track) = track_at(&tracks, position) else {
        error!("No track at position {}", position);
    };

    let controller = ctx.playback().await;
    activate(&ctx, &controller, &track).await;
    ctx.persist_playback(&controller).await;
}

/// Toggles `track`, running the authorization flow once when it is required.
pub(crate) async fn activate(ctx: &Context, controller: &PlaybackController, track: &Track) {
    let mut outcome = controller.activate(track).await;

    if matches!(outcome, PlaybackOutcome::AuthorizationRequired) {
        info!("Spotify authorization required to play tracks");
        if ctx.user_credentials.get_token().await.is_none()
            && spotify::auth::authorize(
                Arc::clone(&ctx.user_credentials),
                &ctx.settings.server_address,
            )
            .await
            .is_none()
        {
            warning!("Spotify authorization did not complete");
            return;
        }

        if controller.device().await.is_none() {
            match ctx.find_device().await {
                Some(device_id) => controller.register_device(device_id).await,
                None => return,
            }
        }
        outcome = controller.activate(track).await;
    }

    report(track, outcome);
}

fn report(track: &Track, outcome: PlaybackOutcome) {
    match outcome {
        PlaybackOutcome::Started(_) => success!(
            "Playing {} - {}",
            track.name,
            track.artist_names().join(", ")
        ),
        PlaybackOutcome::Paused(_) => success!("Paused {}", track.name),
        PlaybackOutcome::AuthorizationRequired => {
            warning!("Spotify authorization required. Run `reko auth` first.")
        }
        PlaybackOutcome::Failed(e) => warning!("Cannot play {}: {}", track.name, e),
    }
}

pub async fn devices() {
    let ctx = Context::load().await;
    if ctx.user_credentials.get_token().await.is_none() {
        error!("Spotify authorization required. Run `reko auth` first.");
    }

    let client = &ctx.client;
    match ctx
        .user_credentials
        .authorized(|token| async move { client.devices(&token).await })
        .await
    {
        Ok(devices) if devices.is_empty() => {
            info!("No devices found. Open Spotify on any device first.")
        }
        Ok(devices) => println!("{}", Table::new(utils::device_table_rows(&devices))),
        Err(e) => error!("Failed to list devices: {}", e),
    }
}
