//! # API Module
//!
//! HTTP endpoints of the short-lived local server that completes the
//! interactive Spotify authorization.
//!
//! ## Endpoints
//!
//! - [`callback`] - Redirect target of the authorize endpoint. Serves a small
//!   page that forwards the URL fragment (where the implicit grant puts the
//!   token) to [`token`].
//! - [`token`] - Validates the `state` and stores the user credential in the
//!   shared pending-authorization slot.
//! - [`health`] - Returns application status and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use reko::api::{callback, health, token};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/token", get(token))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;
mod token;

pub use callback::callback;
pub use health::health;
pub use token::token;
