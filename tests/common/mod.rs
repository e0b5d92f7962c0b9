#![allow(dead_code)]

//! In-process fake of the Spotify, completion and likes services.

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use reko::config::{CompletionSettings, Grant, Settings, SpotifySettings};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct Hits {
    pub token: AtomicUsize,
    pub search: AtomicUsize,
    pub artists: AtomicUsize,
    pub play: AtomicUsize,
    pub pause: AtomicUsize,
    pub devices: AtomicUsize,
    pub playlists: AtomicUsize,
    pub playlist_tracks: AtomicUsize,
    pub completions: AtomicUsize,
    pub likes: AtomicUsize,
}

#[derive(Default)]
pub struct FakeState {
    pub hits: Hits,
    /// Non-zero forces every search to answer with this status.
    pub search_status: AtomicU16,
    /// Non-zero forces the token endpoint to answer with this status.
    pub token_status: AtomicU16,
    /// Milliseconds the token endpoint waits before answering.
    pub token_delay_ms: AtomicU64,
    /// Searches and player commands made with this bearer token are rejected with 401.
    pub rejected_token: Mutex<Option<String>>,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub token_auth: Mutex<Vec<String>>,
    pub search_tokens: Mutex<Vec<String>>,
    pub artist_ids: Mutex<Vec<String>>,
    pub play_requests: Mutex<Vec<(String, Value)>>,
    pub added_chunks: Mutex<Vec<usize>>,
    pub prompts: Mutex<Vec<String>>,
    pub liked: Mutex<Vec<Value>>,
}

pub struct FakeService {
    pub addr: SocketAddr,
    pub state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeService {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/artists", get(artists))
            .route("/v1/me/player/play", put(play))
            .route("/v1/me/player/pause", put(pause))
            .route("/v1/me/player/devices", get(devices))
            .route("/v1/users/{user_id}/playlists", post(create_playlist))
            .route("/v1/playlists/{playlist_id}/tracks", post(add_tracks))
            .route("/openai/completions", post(completions))
            .route("/likes/likedSongs", post(liked_songs))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake service");
        let addr = listener.local_addr().expect("fake service address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake service");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn count(&self, counter: impl Fn(&Hits) -> &AtomicUsize) -> usize {
        counter(&self.state.hits).load(Ordering::SeqCst)
    }

    pub fn fail_searches(&self, status: u16) {
        self.state.search_status.store(status, Ordering::SeqCst);
    }

    pub fn fail_token(&self, status: u16) {
        self.state.token_status.store(status, Ordering::SeqCst);
    }

    pub fn delay_token(&self, delay: Duration) {
        self.state
            .token_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn reject_token(&self, token: &str) {
        *self.state.rejected_token.lock().unwrap() = Some(token.to_string());
    }

    pub fn spotify_settings(&self) -> SpotifySettings {
        SpotifySettings {
            client_id: "id".into(),
            client_secret: "secret".into(),
            api_url: self.url("/v1"),
            token_url: self.url("/api/token"),
            auth_url: self.url("/authorize"),
            redirect_uri: self.url("/callback"),
            user_id: Some("listener".into()),
            device_id: None,
        }
    }

    pub fn settings(&self, data_dir: &Path) -> Settings {
        Settings {
            spotify: self.spotify_settings(),
            catalog_grant: Grant::ClientCredentials,
            completion: CompletionSettings {
                api_url: self.url("/openai"),
                api_key: Some("sk-test".into()),
                model: "test-model".into(),
            },
            likes_url: Some(self.url("/likes")),
            user_id: Some("listener".into()),
            server_address: "127.0.0.1:0".into(),
            refresh_interval: Duration::from_secs(3600),
            search_limit: 1,
            data_dir: data_dir.to_path_buf(),
        }
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}

fn rejected(state: &FakeState, headers: &HeaderMap) -> bool {
    state.rejected_token.lock().unwrap().as_deref() == Some(bearer(headers).as_str())
}

fn track(name: &str, artists: &[(&str, &str)]) -> Value {
    json!({
        "name": name,
        "uri": format!("spotify:track:{}", name.to_lowercase().replace(' ', "-")),
        "preview_url": null,
        "album": { "name": format!("{} album", name), "images": [{ "url": "http://img/1" }] },
        "artists": artists
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect::<Vec<_>>(),
    })
}

async fn token(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.hits.token.fetch_add(1, Ordering::SeqCst) + 1;
    state.token_forms.lock().unwrap().push(form);
    state.token_auth.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    );

    let delay = state.token_delay_ms.load(Ordering::SeqCst);
    if delay != 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = state.token_status.load(Ordering::SeqCst);
    if status != 0 {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({ "error": "invalid_grant" }))).into_response();
    }

    Json(json!({
        "access_token": format!("token-{}", n),
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

async fn search(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.hits.search.fetch_add(1, Ordering::SeqCst);
    let token = bearer(&headers);
    state.search_tokens.lock().unwrap().push(token.clone());

    let status = state.search_status.load(Ordering::SeqCst);
    if status != 0 {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({ "error": { "status": status.as_u16() } }))).into_response();
    }
    if rejected(&state, &headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" }))).into_response();
    }

    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);

    let items = match params.get("q").map(String::as_str) {
        Some("lofi beats") => vec![track("Lofi Song", &[("a1", "Lofi Artist")])],
        Some("dup") => vec![
            track("First", &[("a1", "Lofi Artist"), ("a2", "Jazz Artist")]),
            track("Second", &[("a2", "Jazz Artist")]),
            track("Third", &[("a1", "Lofi Artist")]),
        ],
        Some("broken") => return (StatusCode::OK, "<html>not json</html>").into_response(),
        Some("nothing") => return Json(json!({})).into_response(),
        _ => Vec::new(),
    };

    let items: Vec<Value> = items.into_iter().take(limit).collect();
    Json(json!({ "tracks": { "items": items } })).into_response()
}

async fn artists(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.artists.fetch_add(1, Ordering::SeqCst);
    let ids = params.get("ids").cloned().unwrap_or_default();
    state.artist_ids.lock().unwrap().push(ids.clone());

    let artists: Vec<Value> = ids
        .split(',')
        .map(|id| match id {
            "a1" => json!({ "id": "a1", "genres": ["chill", "lofi"] }),
            "a2" => json!({ "id": "a2", "genres": ["jazz", "lofi"] }),
            _ => Value::Null,
        })
        .collect();

    Json(json!({ "artists": artists }))
}

async fn play(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.hits.play.fetch_add(1, Ordering::SeqCst);
    if rejected(&state, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let device = params.get("device_id").cloned().unwrap_or_default();
    state.play_requests.lock().unwrap().push((device, body));
    StatusCode::NO_CONTENT
}

async fn pause(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> StatusCode {
    state.hits.pause.fetch_add(1, Ordering::SeqCst);
    if rejected(&state, &headers) {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::NO_CONTENT
}

async fn devices(State(state): State<Arc<FakeState>>) -> Json<Value> {
    state.hits.devices.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "devices": [
            { "id": "phone", "name": "Phone", "type": "Smartphone", "is_active": false },
            { "id": "laptop", "name": "Laptop", "type": "Computer", "is_active": true },
        ]
    }))
}

async fn create_playlist(
    State(state): State<Arc<FakeState>>,
    UrlPath(user_id): UrlPath<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.hits.playlists.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": format!("{}-playlist", user_id),
            "name": body["name"],
            "description": body["description"],
            "public": body["public"],
        })),
    )
}

async fn add_tracks(
    State(state): State<Arc<FakeState>>,
    UrlPath(_playlist_id): UrlPath<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.hits.playlist_tracks.fetch_add(1, Ordering::SeqCst);
    let count = body["uris"].as_array().map(Vec::len).unwrap_or_default();
    state.added_chunks.lock().unwrap().push(count);
    (StatusCode::CREATED, Json(json!({ "snapshot_id": "snapshot" })))
}

async fn completions(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    state.hits.completions.fetch_add(1, Ordering::SeqCst);
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    state.prompts.lock().unwrap().push(prompt);
    Json(json!({
        "choices": [{ "text": "Song A - Artist1\n\nSong B - Artist2\n" }]
    }))
}

async fn liked_songs(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    state.hits.likes.fetch_add(1, Ordering::SeqCst);
    let mut liked = state.liked.lock().unwrap();

    let same = |song: &Value| {
        song["user_id"] == body["user_id"]
            && song["songName"] == body["songName"]
            && song["artists"] == body["artists"]
    };

    let message = if liked.iter().any(same) {
        liked.retain(|song| !same(song));
        "Liked song deleted"
    } else {
        liked.push(body.clone());
        "Liked song added"
    };

    Json(json!({ "message": message, "likedSongs": liked.clone() }))
}
