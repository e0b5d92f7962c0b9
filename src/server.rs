use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, types::PendingAuthorization};

/// Builds the callback router around the shared pending-authorization slot.
pub fn router(state: Arc<Mutex<Option<PendingAuthorization>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route("/token", get(api::token).layer(Extension(state)))
}

/// Serves the callback router on `address` until the task is aborted.
pub async fn start_api_server(
    address: &str,
    state: Arc<Mutex<Option<PendingAuthorization>>>,
) -> Result<(), String> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address {}: {}", address, e))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    axum::serve(listener, router(state))
        .await
        .map_err(|e| e.to_string())
}
