//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::toml_config::AppConfig;
use crate::cli::{Cli, Commands};
use crate::output::OverwritePolicy;
use crate::utils::logging::{LogFormat, LogLevel};

/// Effective configuration and where it came from
#[derive(Debug, Clone)]
pub struct ConfigReport {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
    pub env_overrides: usize,
    pub cli_overrides: usize,
}

impl ConfigReport {
    /// Log how the configuration was assembled; call once logging is up
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => info!("Configuration file: {}", path.display()),
            None => info!("No configuration file found, using defaults"),
        }
        if self.env_overrides > 0 {
            info!("Applied {} environment variable overrides", self.env_overrides);
        }
        if self.cli_overrides > 0 {
            info!("Applied {} CLI configuration overrides", self.cli_overrides);
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<ConfigReport> {
    let base = std::env::current_dir().context("Cannot determine working directory")?;
    initialize_with(cli, &base, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an explicit search base and environment
pub fn initialize_with<F>(cli: &Cli, base: &std::path::Path, env: F) -> Result<ConfigReport>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1 + 2: defaults, then file
    let source = match &cli.config {
        Some(path) => Some(path.clone()),
        None => AppConfig::discover(base),
    };
    let mut config = match &source {
        Some(path) => AppConfig::load_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };

    // Step 3: environment
    let env_overrides = config
        .apply_env(env)
        .context("Invalid environment override")?;

    // Step 4: command line
    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli)?;

    config.validate().context("Invalid configuration")?;

    Ok(ConfigReport {
        config,
        source,
        env_overrides,
        cli_overrides,
    })
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> Result<usize> {
    let mut cli_overrides = 0;

    if let Some(level) = &cli.log_level {
        config.log.level = level.parse::<LogLevel>()?;
        cli_overrides += 1;
    }
    if let Some(format) = &cli.log_format {
        config.log.format = format.parse::<LogFormat>()?;
        cli_overrides += 1;
    }
    if cli.overwrite {
        config.output.overwrite = OverwritePolicy::Always;
        cli_overrides += 1;
    }

    match &cli.command {
        Commands::Render(args) => {
            if let Some(ffmpeg) = &args.ffmpeg {
                config.engine.binary = ffmpeg.clone();
                cli_overrides += 1;
            }
            if let Some(threads) = args.threads {
                config.engine.threads = threads;
                cli_overrides += 1;
            }
            if let Some(output) = &args.output {
                config.output.path = output.clone();
                cli_overrides += 1;
            }
        }
        Commands::Check(args) => {
            if let Some(ffmpeg) = &args.ffmpeg {
                config.engine.binary = ffmpeg.clone();
                cli_overrides += 1;
            }
        }
        Commands::Plan(_) => {}
    }

    Ok(cli_overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["reelforge", "check"]).unwrap();
        let report = initialize_with(&cli, dir.path(), no_env).unwrap();
        assert!(report.source.is_none());
        assert_eq!(report.cli_overrides, 0);
        assert_eq!(report.config.engine.binary, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("reelforge.toml"),
            "[engine]\nthreads = 2\nbinary = \"file-ffmpeg\"\n[log]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "reelforge", "render", "--topic", "tea", "--threads", "8", "--log-level", "trace",
        ])
        .unwrap();
        let env = |key: &str| match key {
            "REELFORGE_THREADS" => Some("4".to_string()),
            "REELFORGE_FFMPEG" => Some("env-ffmpeg".to_string()),
            _ => None,
        };

        let report = initialize_with(&cli, dir.path(), env).unwrap();
        assert_eq!(report.source, Some(dir.path().join("reelforge.toml")));
        assert_eq!(report.config.engine.threads, 8);
        assert_eq!(report.config.engine.binary, PathBuf::from("env-ffmpeg"));
        assert_eq!(report.config.log.level, LogLevel::Trace);
        assert_eq!(report.env_overrides, 2);
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let cli = Cli::try_parse_from([
            "reelforge",
            "--config",
            missing.to_str().unwrap(),
            "check",
        ])
        .unwrap();
        assert!(initialize_with(&cli, dir.path(), no_env).is_err());
    }

    #[test]
    fn test_invalid_cli_log_level() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::try_parse_from(["reelforge", "check", "--log-level", "chatty"]).unwrap();
        assert!(initialize_with(&cli, dir.path(), no_env).is_err());
    }
}
