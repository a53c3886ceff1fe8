// Domain models - Plans, segments and render job state

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;


/// Storyboard style requested from a plan source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStyle {
    /// Teaches frameworks and actionable steps
    Educational,
    /// Narrative pacing with a plot twist payoff
    Story,
    /// Launch a product with social proof and urgency
    Product,
    /// Pep talk energy with mantra and challenge
    Motivational,
}

impl PlanStyle {
    pub const ALL: [PlanStyle; 4] = [
        PlanStyle::Educational,
        PlanStyle::Story,
        PlanStyle::Product,
        PlanStyle::Motivational,
    ];

    /// Parse style from string
    pub fn parse(style_str: &str) -> Result<Self, DomainError> {
        match style_str.trim().to_lowercase().as_str() {
            "educational" => Ok(PlanStyle::Educational),
            "story" => Ok(PlanStyle::Story),
            "product" => Ok(PlanStyle::Product),
            "motivational" => Ok(PlanStyle::Motivational),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid style: {}. Valid styles: educational, story, product, motivational",
                style_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStyle::Educational => "educational",
            PlanStyle::Story => "story",
            PlanStyle::Product => "product",
            PlanStyle::Motivational => "motivational",
        }
    }
}

impl FromStr for PlanStyle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PlanStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed beat of the short
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub narration: String,
    pub visual_cue: String,
    /// Seconds, strictly positive
    pub duration: f64,
}

impl Segment {
    /// Duration as passed to the encoder (`-t`), two decimals
    pub fn duration_arg(&self) -> String {
        format!("{:.2}", self.duration)
    }
}

/// Storyboard produced by a plan source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub title: String,
    pub hook: String,
    pub summary: String,
    pub cta: String,
    pub segments: Vec<Segment>,
}

impl Plan {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Orchestrator state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPhase {
    Idle,
    AwaitingEncoder,
    PlanReady,
    RenderingSegments,
    Stitching,
    Complete,
    Failed,
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RenderPhase::Idle => "idle",
            RenderPhase::AwaitingEncoder => "awaiting-encoder",
            RenderPhase::PlanReady => "plan-ready",
            RenderPhase::RenderingSegments => "rendering-segments",
            RenderPhase::Stitching => "stitching",
            RenderPhase::Complete => "complete",
            RenderPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Names of the transient files a render job places in the engine filesystem.
///
/// Every name is scoped by the job id so two jobs can never collide, even though
/// the orchestrator only ever runs one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactNames {
    job_id: u64,
}

impl ArtifactNames {
    pub fn new(job_id: u64) -> Self {
        Self { job_id }
    }

    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn slide(&self, index: usize) -> String {
        format!("j{}-slide-{}.png", self.job_id, index)
    }

    pub fn segment(&self, index: usize) -> String {
        format!("j{}-segment-{}.mp4", self.job_id, index)
    }

    pub fn manifest(&self) -> String {
        format!("j{}-filelist.txt", self.job_id)
    }

    pub fn output(&self) -> String {
        format!("j{}-short.mp4", self.job_id)
    }

    /// Segment clip names for `count` segments, in playback order
    pub fn segments(&self, count: usize) -> Vec<String> {
        (0..count).map(|index| self.segment(index)).collect()
    }
}

/// Ephemeral state of one render invocation
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub job_id: u64,
    pub plan: Arc<Plan>,
    pub current_index: usize,
    pub total_segments: usize,
    pub progress_percent: u8,
    pub phase: RenderPhase,
}

impl RenderJob {
    pub fn new(job_id: u64, plan: Arc<Plan>) -> Self {
        let total_segments = plan.segment_count();
        Self {
            job_id,
            plan,
            current_index: 0,
            total_segments,
            progress_percent: 0,
            phase: RenderPhase::RenderingSegments,
        }
    }

    pub fn names(&self) -> ArtifactNames {
        ArtifactNames::new(self.job_id)
    }

    /// Record that segment `index` has been encoded
    pub fn complete_segment(&mut self, index: usize) {
        self.current_index = index + 1;
        self.progress_percent = if self.total_segments == 0 {
            100
        } else {
            ((self.current_index * 100) / self.total_segments).min(100) as u8
        };
    }
}

/// Where a status line originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Pipeline,
    Engine,
}

/// One line of the build log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub label: String,
    pub timestamp: DateTime<Utc>,
    pub source: StatusSource,
}

impl StatusEntry {
    pub fn new(label: impl Into<String>, source: StatusSource) -> Self {
        Self {
            label: label.into(),
            timestamp: Utc::now(),
            source,
        }
    }
}

impl fmt::Display for StatusEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timestamp.format("%H:%M:%S"), self.label)
    }
}
