use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use reko::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize playback and playlist access with Spotify
    Auth,

    /// Ask for songs matching a mood and search them
    Recommend(RecommendOptions),

    /// Search the catalog for one or more queries
    Search(SearchOptions),

    /// List or clear the accumulated tracks
    Tracks(TracksOptions),

    /// Play or pause a track by its position
    Play(PositionOption),

    /// List available Spotify devices
    Devices,

    /// Like or unlike a track by its position
    Like(PositionOption),

    /// List liked songs
    Likes,

    #[clap(about = "Create a playlist from the liked songs")]
    Export(ExportOptions),

    /// Interactive session
    Session,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendOptions {
    /// Mood, feeling or free-text query
    #[clap(required = true, num_args = 1..)]
    mood: Vec<String>,

    /// Tracks to keep per suggested song
    #[clap(long)]
    limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Queries, e.g. "Song Name - Artist Name"
    #[clap(required = true, num_args = 1..)]
    queries: Vec<String>,

    #[clap(long)]
    limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Forget all accumulated tracks
    #[clap(long)]
    clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PositionOption {
    /// Position as shown by `reko tracks` (starting at 1)
    #[clap(value_parser = clap::value_parser!(u64).range(1..))]
    position: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Playlist name
    #[clap(long)]
    name: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Recommend(opt) => cli::recommend(opt.mood.join(" "), opt.limit).await,
        Command::Search(opt) => cli::search(opt.queries, opt.limit).await,
        Command::Tracks(opt) => cli::tracks(opt.clear).await,
        Command::Play(opt) => cli::play(opt.position as usize).await,
        Command::Devices => cli::devices().await,
        Command::Like(opt) => cli::like(opt.position as usize).await,
        Command::Likes => cli::likes().await,
        Command::Export(opt) => cli::export(opt.name).await,
        Command::Session => cli::session().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
