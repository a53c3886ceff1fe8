// Domain rules - Plan validation and runtime policies

use std::collections::HashSet;

use crate::domain::errors::*;
use crate::domain::model::*;


/// Total runtime of a storyboard in seconds
pub fn estimate_runtime(segments: &[Segment]) -> f64 {
    segments.iter().map(|segment| segment.duration).sum()
}

/// Business rules a plan must satisfy before it can be rendered
pub struct PlanRules;

impl PlanRules {
    /// Validate a plan produced by a plan source or loaded from disk
    pub fn validate(plan: &Plan) -> Result<(), DomainError> {
        if plan.segments.is_empty() {
            return Err(DomainError::ValidationFailed(
                "Plan has no segments".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, segment) in plan.segments.iter().enumerate() {
            if segment.id.trim().is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "Segment {} has an empty id",
                    index + 1
                )));
            }
            if !seen.insert(segment.id.as_str()) {
                return Err(DomainError::ValidationFailed(format!(
                    "Duplicate segment id: {}",
                    segment.id
                )));
            }
            Self::validate_duration(segment)?;
        }

        Ok(())
    }

    fn validate_duration(segment: &Segment) -> Result<(), DomainError> {
        if !segment.duration.is_finite() || segment.duration <= 0.0 {
            return Err(DomainError::ValidationFailed(format!(
                "Segment {} must have a positive duration, got {}",
                segment.id, segment.duration
            )));
        }
        // Durations are passed with two decimals; anything that rounds to zero encodes nothing.
        if segment.duration < 0.005 {
            return Err(DomainError::ValidationFailed(format!(
                "Segment {} is shorter than the encoder resolution of 0.01s",
                segment.id
            )));
        }
        Ok(())
    }
}
