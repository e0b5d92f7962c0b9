pub mod cache;
mod credential;
mod export;
mod genres;
mod playback;
mod search;
mod tracks;

pub use credential::AuthorizationRequest;
pub use credential::AutoRefresh;
pub use credential::CredentialManager;
pub use export::ExportReport;
pub use export::export_playlist;
pub use export::export_uris;
pub use genres::GenreSet;
pub use playback::PlaybackController;
pub use playback::PlaybackOutcome;
pub use search::BatchReport;
pub use search::SearchOrchestrator;
pub use tracks::TrackCollection;
