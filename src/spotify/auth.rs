use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    config::AUTHORIZE_SCOPES,
    management::CredentialManager,
    server::start_api_server,
    spotify::{ApiError, decode},
    types::{Credential, PendingAuthorization, TokenResponse},
    utils, warning,
};

/// How long the interactive flow waits for the browser to come back.
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound for one token endpoint round trip.
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the interactive authorization flow and injects the resulting token.
///
/// This function orchestrates the whole user-authorization round trip:
/// 1. Builds the authorize URL with a random `state` and opens the browser
/// 2. Starts the local callback server
/// 3. Waits for the callback page to forward the token fragment
/// 4. Hands the token to `credentials` via [`CredentialManager::set_token`]
///
/// The implicit grant (`response_type=token`) returns the access token in the
/// URL fragment, which browsers never send to a server. The callback page
/// served by [`crate::api::callback`] therefore reads the fragment client-side
/// and forwards it to `/token`.
///
/// # Returns
///
/// The injected credential, or `None` when the browser never came back within
/// the timeout or the server could not start.
///
/// # Example
///
/// ```
/// let credentials = Arc::new(CredentialManager::user(&settings));
/// if auth::authorize(Arc::clone(&credentials), &settings.server_address).await.is_some() {
///     success!("Authorized");
/// }
/// ```
pub async fn authorize(
    credentials: Arc<CredentialManager>,
    server_address: &str,
) -> Option<Credential> {
    let request = match credentials.authorize_interactive() {
        Ok(request) => request,
        Err(e) => {
            warning!("Cannot build authorization URL: {}", e);
            return None;
        }
    };

    let shared_state = Arc::new(Mutex::new(Some(PendingAuthorization {
        state: request.state,
        credential: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let address = server_address.to_string();
    let server = tokio::spawn(async move {
        if let Err(e) = start_api_server(&address, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let credential = wait_for_token(shared_state, AUTHORIZATION_TIMEOUT).await;
    server.abort();

    let credential = credential?;
    credentials.set_token(credential.clone()).await;
    Some(credential)
}

/// Polls the shared state until the callback stored a credential or `max_wait` elapsed.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PendingAuthorization>>>,
    max_wait: Duration,
) -> Option<Credential> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(credential) = lock.as_ref().and_then(|p| p.credential.clone()) {
            return Some(credential);
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    None
}

/// Builds the authorize redirect for the implicit grant.
///
/// The URL carries `client_id`, `redirect_uri`, the fixed scope set joined by
/// spaces, `response_type=token` and the anti-forgery `state`.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> Result<String, String> {
    let scope = AUTHORIZE_SCOPES.join(" ");
    Url::parse_with_params(
        auth_url,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
            ("response_type", "token"),
            ("state", state),
        ],
    )
    .map(|url| url.to_string())
    .map_err(|e| e.to_string())
}

/// Posts a grant to the token endpoint.
///
/// The client id and secret travel in a Basic `Authorization` header, the
/// grant in an `application/x-www-form-urlencoded` body.
///
/// # Errors
///
/// - [`ApiError::Status`] when the endpoint rejects the grant
/// - [`ApiError::Malformed`] when the body is not JSON
/// - [`ApiError::Network`] when the endpoint is unreachable
pub async fn request_token(
    http: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    form: &[(&str, &str)],
    timeout: Duration,
) -> Result<TokenResponse, ApiError> {
    let response = http
        .post(token_url)
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(client_id, client_secret),
        )
        .form(form)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status));
    }

    decode(response).await
}
