use std::sync::Arc;

use axum::{Extension, extract::Query, response::Html};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    types::{Credential, CredentialSource, PendingAuthorization},
    warning,
};

#[derive(Debug, Deserialize)]
pub struct TokenFragment {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Receives the forwarded fragment and stores the user credential.
///
/// The `state` must match the one sent with the authorize redirect, otherwise
/// the token is discarded.
pub async fn token(
    Query(fragment): Query<TokenFragment>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PendingAuthorization>>>>,
) -> Html<&'static str> {
    if let Some(error) = fragment.error {
        warning!("Spotify authorization was denied: {}", error);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(access_token) = fragment.access_token.filter(|t| !t.is_empty()) else {
        return Html("<h4>Missing access token.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if fragment.state.as_deref() != Some(pending.state.as_str()) {
        warning!("Authorization callback carried an unexpected state, ignoring it");
        return Html("<h4>State mismatch.</h4>");
    }

    pending.credential = Some(Credential {
        access_token,
        source: CredentialSource::UserAuthorization,
        obtained_at: Utc::now().timestamp() as u64,
        expires_in: fragment.expires_in,
    });

    Html("<h2>Authorization successful.</h2><p>You can close this window.</p>")
}
