//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Metadata table and video selection shared by every command
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Metadata table (JSON array of rows)
    #[arg(short, long, env = "ASSEMBLER_METADATA")]
    pub metadata: PathBuf,

    /// Video ids to process, comma separated (default: every video in the table)
    #[arg(short, long, value_delimiter = ',')]
    pub videos: Vec<u32>,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Concatenate intro, clip, call-to-action and outro
    #[arg(long)]
    pub assemble: bool,

    /// Lay background audio under the last produced artifact
    #[arg(long)]
    pub audio: bool,

    /// Clips processed at once (0 = one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep going after a clip fails and report all failures at the end
    #[arg(long)]
    pub continue_on_error: bool,

    /// Directory holding the raw recordings
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Directory for raw clips and file lists
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Directory for assembled clips
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the clips command
#[derive(Args, Debug, Clone)]
pub struct ClipsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the cards command
#[derive(Args, Debug, Clone)]
pub struct CardsArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}
