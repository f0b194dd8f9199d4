use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "iatrack",
    version,
    about = "Convert subtitles and track playback resume positions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Subtitle conversion and inspection.
    #[command(subcommand)]
    Subs(SubsCommand),
    /// Playback-progress store operations.
    #[command(subcommand)]
    Progress(ProgressCommand),
}

#[derive(Debug, Subcommand)]
pub enum SubsCommand {
    /// Convert an SRT document to WebVTT.
    Convert(ConvertArgs),
    /// List the cues of a WebVTT file, or the cue active at a given time.
    Cues(CuesArgs),
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// The file to read from, or '-' for standard input.
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "-",
        conflicts_with = "url"
    )]
    pub input: String,
    /// Fetch the subtitle document from a URL instead of a file.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
    /// The file to write to, or '-' for standard output.
    #[arg(short, long, value_name = "FILE", default_value = "-")]
    pub output: String,
}

#[derive(Debug, Args)]
pub struct CuesArgs {
    /// WebVTT file to parse, or '-' for standard input.
    pub file: String,
    /// Print only the cue active at this playback time, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub at: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum ProgressCommand {
    /// Record a playback position (player hook).
    Save(SaveArgs),
    /// Show the stored position for an item, or for one of its files.
    Show {
        item: String,
        file: Option<String>,
    },
    /// List resumable items, most recently watched first.
    List(ListArgs),
    /// Remove the entry for one file, or every entry for an item.
    Remove {
        item: String,
        file: Option<String>,
    },
    /// Drop all stored progress.
    Clear,
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Stable content identifier of the item.
    pub item: String,
    /// Media file within the item, or '__album__' for album-level audio.
    pub file: String,
    /// Playback position in seconds (album-level: percentage 0-100).
    #[arg(long, value_name = "SECONDS")]
    pub position: f64,
    /// Total duration in seconds (album-level: 100).
    #[arg(long, value_name = "SECONDS")]
    pub duration: f64,
    #[arg(long)]
    pub title: Option<String>,
    /// Media kind, e.g. "movies" or "audio".
    #[arg(long, value_name = "KIND")]
    pub media_type: Option<String>,
    #[arg(long, value_name = "URL")]
    pub image_url: Option<String>,
    /// Current track number within an album-level item.
    #[arg(long, value_name = "N")]
    pub track_index: Option<usize>,
    /// Filename of the current track within an album-level item.
    #[arg(long, value_name = "FILE")]
    pub track_file: Option<String>,
    /// Position within the current track, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub track_position: Option<f64>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// List audio (continue listening) instead of video.
    #[arg(long)]
    pub audio: bool,
    /// Maximum number of entries to print.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}
