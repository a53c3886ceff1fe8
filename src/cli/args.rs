//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;
use clap_num::number_range;

/// Encoder thread counts accepted on the command line
fn parse_threads(s: &str) -> Result<usize, String> {
    number_range(s, 1, 64)
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Topic of the short
    #[arg(short, long)]
    pub topic: String,

    /// Storyboard style (educational, story, product, motivational)
    #[arg(short, long, default_value = "educational")]
    pub style: String,

    /// Output format when printing (json, yaml)
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Plan file (JSON or YAML)
    #[arg(short, long, conflicts_with_all = ["topic", "style"])]
    pub plan: Option<PathBuf>,

    /// Topic to generate a plan for
    #[arg(short, long, required_unless_present = "plan")]
    pub topic: Option<String>,

    /// Storyboard style used with --topic
    #[arg(short, long)]
    pub style: Option<String>,

    /// Output file path (default: youtube-short.mp4)
    #[arg(short, long)]
    pub output: Option<String>,

    /// ffmpeg executable
    #[arg(long, env = "REELFORGE_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Encoder threads per segment (1-64)
    #[arg(long, value_parser = parse_threads)]
    pub threads: Option<usize>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// ffmpeg executable
    #[arg(long, env = "REELFORGE_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,
}
