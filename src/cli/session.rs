use std::sync::Arc;

use tabled::Table;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::Mutex,
};

use crate::{
    cli::{
        Context,
        context::spinner,
        library::{toggle_like, track_at},
        playback::activate,
        search::{run_batch, show_batch},
    },
    completion::CompletionClient,
    config::Grant,
    info, likes,
    management::{AutoRefresh, GenreSet, TrackCollection},
    success, utils, warning,
};

const HELP: &str = "\
<mood>        ask for songs matching a mood and search them
search <q>    search the catalog for <q>
play <n>      play or pause track <n>
like <n>      like or unlike track <n>
tracks        list all tracks
genres        show the genres of the last search
devices       list Spotify devices
help          show this help
quit          leave the session";

enum Input<'a> {
    Mood(&'a str),
    Search(&'a str),
    Play(usize),
    Like(usize),
    Tracks,
    Genres,
    Devices,
    Help,
    Quit,
    Invalid(&'a str),
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let position = || rest.parse::<usize>().ok().filter(|n| *n > 0);

    match command {
        "quit" | "exit" if rest.is_empty() => Input::Quit,
        "help" if rest.is_empty() => Input::Help,
        "tracks" if rest.is_empty() => Input::Tracks,
        "genres" if rest.is_empty() => Input::Genres,
        "devices" if rest.is_empty() => Input::Devices,
        "search" if !rest.is_empty() => Input::Search(rest),
        "play" => position().map(Input::Play).unwrap_or(Input::Invalid(line)),
        "like" => position().map(Input::Like).unwrap_or(Input::Invalid(line)),
        _ => Input::Mood(line),
    }
}

/// Interactive session keeping credentials fresh while it runs.
pub async fn session() {
    let ctx = Context::load().await;
    let tracks = Arc::new(Mutex::new(ctx.load_tracks().await));
    let genres = Arc::new(Mutex::new(GenreSet::default()));
    let controller = ctx.playback().await;
    let completion = CompletionClient::new(&ctx.settings.completion);
    let likes_client = ctx.likes_client();

    if ctx.catalog_credentials.get_token().await.is_none() {
        warning!("No catalog credential yet, searches will retry on first use");
    }
    let mut refreshers: Vec<AutoRefresh> = vec![
        ctx.catalog_credentials
            .start_auto_refresh(ctx.settings.refresh_interval),
    ];
    // Tokens from the browser flow cannot be renewed.
    if matches!(ctx.user_credentials.grant(), Grant::RefreshToken(_)) {
        refreshers.push(
            ctx.user_credentials
                .start_auto_refresh(ctx.settings.refresh_interval),
        );
    }

    info!("Type a mood to get recommendations, `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warning!("Cannot read input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse(&line) {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Mood(mood) => {
                let artists = likes::liked_artists(&ctx.liked().await);
                let pb = spinner(format!("Asking for songs matching '{}'...", mood));
                let result = completion.recommend(mood, &artists).await;
                pb.finish_and_clear();

                match result {
                    Ok(queries) if queries.is_empty() => warning!("No songs suggested"),
                    Ok(queries) => search(&ctx, &queries, &tracks, &genres).await,
                    Err(e) => warning!("Completion request failed: {}", e),
                }
            }
            Input::Search(query) => {
                search(&ctx, &[query.to_string()], &tracks, &genres).await
            }
            Input::Play(position) => {
                let track = track_at(&*tracks.lock().await, position);
                match track {
                    Some(track) => {
                        let had_user = ctx.user_credentials.current().await.is_some();
                        activate(&ctx, &controller, &track).await;
                        ctx.persist_playback(&controller).await;
                        if !had_user && ctx.user_credentials.current().await.is_some() {
                            refreshers.push(
                                ctx.user_credentials
                                    .start_auto_refresh(ctx.settings.refresh_interval),
                            );
                        }
                    }
                    None => warning!("No track at position {}", position),
                }
            }
            Input::Like(position) => {
                let Some(client) = &likes_client else {
                    warning!("LIKES_API_URL and REKO_USER_ID must be set to like songs");
                    continue;
                };
                let track = track_at(&*tracks.lock().await, position);
                match track {
                    Some(track) => toggle_like(&ctx, client, &track).await,
                    None => warning!("No track at position {}", position),
                }
            }
            Input::Tracks => {
                let tracks = tracks.lock().await;
                if tracks.is_empty() {
                    info!("No tracks yet");
                } else {
                    let liked = ctx.liked().await;
                    println!("{}", Table::new(utils::track_table_rows(tracks.all(), &liked)));
                }
            }
            Input::Genres => {
                let genres = genres.lock().await;
                if genres.is_empty() {
                    info!("No genres yet");
                } else {
                    info!("Genres: {}", genres);
                }
            }
            Input::Devices => match ctx.find_device().await {
                Some(device_id) => {
                    controller.register_device(device_id.clone()).await;
                    success!("Using device {}", device_id);
                }
                None => warning!("No device registered"),
            },
            Input::Invalid(line) => warning!("Cannot parse '{}', try `help`", line),
        }
    }

    drop(refreshers);
    ctx.persist_tracks(&*tracks.lock().await).await;
    ctx.persist_playback(&controller).await;
    success!("Bye");
}

async fn search(
    ctx: &Context,
    queries: &[String],
    tracks: &Arc<Mutex<TrackCollection>>,
    genres: &Arc<Mutex<GenreSet>>,
) {
    let before = tracks.lock().await.len();
    let report = run_batch(
        ctx,
        queries,
        ctx.settings.search_limit,
        Arc::clone(tracks),
        Arc::clone(genres),
    )
    .await;

    let tracks = tracks.lock().await;
    ctx.persist_tracks(&tracks).await;
    show_batch(ctx, &tracks, before, &*genres.lock().await, &report).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_start_at_one() {
        assert!(matches!(parse("play 2"), Input::Play(2)));
        assert!(matches!(parse("play 0"), Input::Invalid(_)));
        assert!(matches!(parse("like x"), Input::Invalid(_)));
    }

    #[test]
    fn anything_else_is_a_mood() {
        assert!(matches!(parse("rainy sunday morning"), Input::Mood("rainy sunday morning")));
        assert!(matches!(parse("  quit "), Input::Quit));
        assert!(matches!(parse("search lofi beats"), Input::Search("lofi beats")));
        assert!(matches!(parse("tracks please"), Input::Mood("tracks please")));
    }
}
