//! ReelForge CLI
//!
//! Renders storyboard plans into 1080x1920 short-form MP4 videos using ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! reelforge plan --topic "sourdough starters" --style educational --out plan.json
//! reelforge render --plan plan.json --output youtube-short.mp4
//! reelforge render --topic "morning routines" --style motivational
//! reelforge check --ffmpeg /usr/local/bin/ffmpeg
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use reelforge::cli::{commands, Cli, Commands};
use reelforge::config_initialization::initialize_configuration_hierarchy;
use reelforge::utils::logging::{init_logging, log_system_info};

/// Main entry point for the ReelForge CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let report = initialize_configuration_hierarchy(&cli)?;

    // Initialize logging
    init_logging(&report.config.log);
    log_system_info();
    report.log_summary();

    // Execute the requested command
    match cli.command {
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args).await?;
        }
        Commands::Render(args) => {
            info!("Executing render command");
            commands::render(args, &report.config).await?;
        }
        Commands::Check(args) => {
            info!("Executing check command");
            commands::check(args, &report.config).await?;
        }
    }

    Ok(())
}
