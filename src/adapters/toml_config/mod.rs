// TOML config adapter - Application configuration from TOML files and environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::output::{OutputConfig, OverwritePolicy};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Config files probed, in order, when no explicit path is given
pub const CONFIG_SEARCH_PATHS: [&str; 2] = ["reelforge.toml", "config/reelforge.toml"];

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "REELFORGE_";

/// Codec engine section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// ffmpeg executable
    pub binary: PathBuf,
    /// Parent of the engine scratch workspace
    pub scratch_dir: Option<PathBuf>,
    /// Encoder threads per invocation
    pub threads: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            scratch_dir: None,
            threads: num_cpus::get(),
        }
    }
}

/// Slide rendering section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidesSection {
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

/// Output section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub path: String,
    pub overwrite: OverwritePolicy,
}

impl Default for OutputSection {
    fn default() -> Self {
        let defaults = OutputConfig::default();
        Self {
            path: defaults.path,
            overwrite: defaults.overwrite,
        }
    }
}

impl From<&OutputSection> for OutputConfig {
    fn from(section: &OutputSection) -> Self {
        OutputConfig {
            path: section.path.clone(),
            overwrite: section.overwrite,
        }
    }
}

/// Whole application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineSection,
    pub slides: SlidesSection,
    pub log: LoggingConfig,
    pub output: OutputSection,
}

impl AppConfig {
    /// Parse TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load a config file
    pub fn load_file(path: &Path) -> Result<Self, DomainError> {
        if !path.exists() {
            return Err(DomainError::FileNotFound(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::FsFail(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// First existing file of [`CONFIG_SEARCH_PATHS`] below `base`
    pub fn discover(base: &Path) -> Option<PathBuf> {
        CONFIG_SEARCH_PATHS
            .iter()
            .map(|candidate| base.join(candidate))
            .find(|candidate| candidate.is_file())
    }

    /// Apply `REELFORGE_*` overrides through `lookup`; returns how many applied
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));

        if let Some(value) = var("FFMPEG") {
            self.engine.binary = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = var("SCRATCH_DIR") {
            self.engine.scratch_dir = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = var("THREADS") {
            self.engine.threads = value
                .trim()
                .parse()
                .map_err(|e| DomainError::BadArgs(format!("Invalid REELFORGE_THREADS: {}", e)))?;
            applied += 1;
        }
        if let Some(value) = var("FONT") {
            self.slides.font_regular = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = var("FONT_BOLD") {
            self.slides.font_bold = Some(PathBuf::from(value));
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.log.level = value.parse::<LogLevel>()?;
            applied += 1;
        }
        if let Some(value) = var("LOG_FORMAT") {
            self.log.format = value.parse::<LogFormat>()?;
            applied += 1;
        }
        if let Some(value) = var("OUTPUT") {
            self.output.path = value;
            applied += 1;
        }
        if let Some(value) = var("OVERWRITE") {
            self.output.overwrite = parse_overwrite(&value)?;
            applied += 1;
        }

        if applied > 0 {
            debug!("Applied {} environment overrides", applied);
        }
        Ok(applied)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.engine.threads == 0 {
            return Err(DomainError::BadArgs(
                "engine.threads must be at least 1".to_string(),
            ));
        }
        if self.engine.binary.as_os_str().is_empty() {
            return Err(DomainError::BadArgs(
                "engine.binary must not be empty".to_string(),
            ));
        }
        if self.log.status_capacity == 0 {
            return Err(DomainError::BadArgs(
                "log.status_capacity must be at least 1".to_string(),
            ));
        }
        if self.output.path.trim().is_empty() {
            return Err(DomainError::BadArgs(
                "output.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an overwrite policy name
pub fn parse_overwrite(value: &str) -> Result<OverwritePolicy, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "always" | "true" | "yes" => Ok(OverwritePolicy::Always),
        "never" | "false" | "no" => Ok(OverwritePolicy::Never),
        _ => Err(DomainError::BadArgs(format!(
            "Invalid overwrite policy: {}",
            value
        ))),
    }
}
