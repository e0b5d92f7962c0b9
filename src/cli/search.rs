use std::sync::Arc;

use tabled::Table;
use tokio::sync::Mutex;

use crate::{
    cli::{Context, context::spinner},
    completion::CompletionClient,
    error, info, likes,
    management::{BatchReport, GenreSet, TrackCollection},
    success, utils, warning,
};

/// Asks the completion service for songs matching `mood` and resolves them.
pub async fn recommend(mood: String, limit: Option<u32>) {
    let ctx = Context::load().await;
    let liked = ctx.liked().await;
    let artists = likes::liked_artists(&liked);

    let pb = spinner(format!("Asking for songs matching '{}'...", mood));
    let queries = match CompletionClient::new(&ctx.settings.completion)
        .recommend(&mood, &artists)
        .await
    {
        Ok(queries) => queries,
        Err(e) => {
            pb.finish_and_clear();
            error!("Completion request failed: {}", e);
        }
    };
    pb.finish_and_clear();

    if queries.is_empty() {
        warning!("No songs suggested for '{}'", mood);
        return;
    }

    for query in &queries {
        info!("Suggested: {}", query);
    }

    search_and_show(&ctx, &queries, limit).await;
}

/// Resolves each query directly against the catalog.
pub async fn search(queries: Vec<String>, limit: Option<u32>) {
    let ctx = Context::load().await;
    search_and_show(&ctx, &queries, limit).await;
}

async fn search_and_show(ctx: &Context, queries: &[String], limit: Option<u32>) {
    let limit = limit.unwrap_or(ctx.settings.search_limit);
    let tracks = Arc::new(Mutex::new(ctx.load_tracks().await));
    let genres = Arc::new(Mutex::new(GenreSet::default()));
    let before = tracks.lock().await.len();

    let report = run_batch(ctx, queries, limit, Arc::clone(&tracks), Arc::clone(&genres)).await;

    let tracks = tracks.lock().await;
    ctx.persist_tracks(&tracks).await;
    show_batch(ctx, &tracks, before, &*genres.lock().await, &report).await;
}

pub(crate) async fn run_batch(
    ctx: &Context,
    queries: &[String],
    limit: u32,
    tracks: Arc<Mutex<TrackCollection>>,
    genres: Arc<Mutex<GenreSet>>,
) -> BatchReport {
    let pb = spinner(format!("Searching {} queries...", queries.len()));
    let report = ctx.orchestrator(tracks, genres).search(queries, limit).await;
    pb.finish_and_clear();
    report
}

pub(crate) async fn show_batch(
    ctx: &Context,
    tracks: &TrackCollection,
    before: usize,
    genres: &GenreSet,
    report: &BatchReport,
) {
    if report.appended == 0 {
        warning!("No tracks found");
        return;
    }

    let liked = ctx.liked().await;
    let rows: Vec<_> = utils::track_table_rows(tracks.all(), &liked)
        .into_iter()
        .skip(before)
        .collect();
    println!("{}", Table::new(rows));

    if !genres.is_empty() {
        info!("Genres: {}", genres);
    }

    if report.failed > 0 {
        warning!("{} of {} queries failed", report.failed, report.queries);
    }
    success!("Added {} tracks", report.appended);
}
