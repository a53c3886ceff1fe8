//! Plan file adapter: reads and writes storyboards as JSON or YAML

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::PlanRules;

/// Serialization format of a plan file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanFormat {
    Json,
    Yaml,
}

impl PlanFormat {
    /// Pick a format from the file extension, JSON when unknown
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => PlanFormat::Yaml,
            _ => PlanFormat::Json,
        }
    }

    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        match format_str.to_lowercase().as_str() {
            "json" => Ok(PlanFormat::Json),
            "yaml" | "yml" => Ok(PlanFormat::Yaml),
            _ => Err(DomainError::BadArgs(format!(
                "Unknown plan format: {}",
                format_str
            ))),
        }
    }
}

/// Parse plan text
pub fn parse_plan(text: &str, format: PlanFormat) -> Result<Plan, DomainError> {
    let plan: Plan = match format {
        PlanFormat::Json => serde_json::from_str(text)
            .map_err(|e| DomainError::ValidationFailed(format!("Invalid plan JSON: {}", e)))?,
        PlanFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| DomainError::ValidationFailed(format!("Invalid plan YAML: {}", e)))?,
    };
    PlanRules::validate(&plan)?;
    Ok(plan)
}

/// Serialize a plan
pub fn render_plan(plan: &Plan, format: PlanFormat) -> Result<String, DomainError> {
    match format {
        PlanFormat::Json => serde_json::to_string_pretty(plan)
            .map_err(|e| DomainError::InternalError(format!("Failed to serialize plan: {}", e))),
        PlanFormat::Yaml => serde_yaml::to_string(plan)
            .map_err(|e| DomainError::InternalError(format!("Failed to serialize plan: {}", e))),
    }
}

/// Load and validate a plan file
pub async fn load_plan(path: &Path) -> Result<Plan, DomainError> {
    let text = tokio::fs::read_to_string(path).await?;
    let plan = parse_plan(&text, PlanFormat::from_path(path))?;
    info!(
        "Loaded plan {:?} with {} segments from {}",
        plan.title,
        plan.segment_count(),
        path.display()
    );
    Ok(plan)
}

/// Write a plan file in the format implied by its extension
pub async fn save_plan(plan: &Plan, path: &Path) -> Result<(), DomainError> {
    let text = render_plan(plan, PlanFormat::from_path(path))?;
    tokio::fs::write(path, text).await?;
    Ok(())
}
