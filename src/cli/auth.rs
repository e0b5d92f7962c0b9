use std::sync::Arc;

use crate::{cli::Context, error, info, spotify, success};

pub async fn auth() {
    let ctx = Context::load().await;
    info!(
        "Waiting for Spotify authorization on {}",
        ctx.settings.server_address
    );

    match spotify::auth::authorize(
        Arc::clone(&ctx.user_credentials),
        &ctx.settings.server_address,
    )
    .await
    {
        Some(_) => success!("Spotify authorization complete"),
        None => error!("Spotify authorization did not complete"),
    }
}
