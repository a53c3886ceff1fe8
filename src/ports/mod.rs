// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules;
use crate::engine::{DirEntry, EngineEvent, EngineHandle};
use crate::slides::SlideRenderError;

/// Port for the sandboxed codec engine and its private filesystem.
///
/// Implementations are not safe for interleaved jobs: callers must drain all
/// job files before another job uses the same instance.
#[async_trait]
pub trait CodecEnginePort: Send + Sync {
    /// Load the engine once; later calls return the same handle
    async fn ensure_loaded(&self) -> Result<EngineHandle, DomainError>;

    /// True once a load has succeeded
    fn is_loaded(&self) -> bool;

    /// Write a file into the engine filesystem
    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError>;

    /// Read a file from the engine filesystem
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Delete a file; deleting a missing file succeeds
    async fn delete_file(&self, name: &str) -> Result<(), DomainError>;

    /// List a directory of the engine filesystem
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, DomainError>;

    /// Run one engine command and wait for it to finish
    async fn invoke(&self, argv: &[String]) -> Result<(), DomainError>;

    /// Subscribe to log and progress events
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}

/// Port for turning a storyboard beat into a still image
#[async_trait]
pub trait SlidePort: Send + Sync {
    /// Render the slide for `segment` as encoded PNG bytes
    async fn render(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        headline: &str,
    ) -> Result<Vec<u8>, SlideRenderError>;
}

/// Port for the external storyboard generator
pub trait PlanSourcePort: Send + Sync {
    /// Produce a plan for a topic in the given style; deterministic for identical inputs
    fn generate_plan(&self, topic: &str, style: PlanStyle) -> Plan;

    /// Total runtime of the given segments in seconds
    fn estimate_runtime(&self, segments: &[Segment]) -> f64 {
        rules::estimate_runtime(segments)
    }
}
