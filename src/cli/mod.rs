//! # CLI Module
//!
//! Command-line layer of reko. Each command builds a [`Context`] from the
//! environment, delegates to the management components and presents the
//! result with the logging macros, spinners and tables.
//!
//! ## Commands
//!
//! - [`auth`] - interactive Spotify authorization through the local callback server
//! - [`recommend`] - mood to song suggestions to resolved tracks
//! - [`search`] - resolve free-text queries directly
//! - [`tracks`] - list or clear the accumulated tracks
//! - [`play`] - play or pause a track by position
//! - [`devices`] - list the user's Spotify devices
//! - [`like`] / [`likes`] - toggle and list liked songs
//! - [`export`] - create a playlist from the liked songs
//! - [`session`] - interactive loop with automatic credential refresh
//!
//! ## Usage
//!
//! ```bash
//! reko auth                       # authorize playback and playlists
//! reko recommend "rainy sunday"   # ask for songs and search them
//! reko play 2                     # play the second track, again to pause
//! reko like 2                     # like it
//! reko export --name "Rain"       # liked songs as a playlist
//! ```
//!
//! Library components never exit the process. Only this layer turns
//! unrecoverable conditions (missing configuration, no authorization) into
//! an `error!` exit.

mod auth;
mod context;
mod library;
mod playback;
mod search;
mod session;

pub use auth::auth;
pub use context::Context;
pub use library::export;
pub use library::like;
pub use library::likes;
pub use library::tracks;
pub use playback::devices;
pub use playback::play;
pub use search::recommend;
pub use search::search;
pub use session::session;
