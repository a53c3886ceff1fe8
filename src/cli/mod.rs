//! CLI module for ReelForge
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ReelForge storyboard-to-short renderer
///
/// Turns a storyboard plan into a vertical 1080x1920 MP4 by rendering one slide
/// per beat, encoding each slide into a clip and stitching the clips together.
#[derive(Parser, Debug)]
#[command(name = "reelforge")]
#[command(about = "ReelForge - Render storyboard plans into vertical short videos")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: reelforge.toml or config/reelforge.toml)
    #[arg(long, global = true, env = "REELFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Overwrite existing output files
    #[arg(long, global = true)]
    pub overwrite: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a storyboard plan for a topic
    Plan(args::PlanArgs),
    /// Render a plan into an MP4 short
    Render(args::RenderArgs),
    /// Check that the encoder can be loaded
    Check(args::CheckArgs),
}
