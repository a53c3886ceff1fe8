//! Codec engine vocabulary shared by the adapters, the progress bus and the orchestrator

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub mod commands;
pub mod fs_lifecycle;
pub mod progress;

pub use commands::VideoProfile;
pub use fs_lifecycle::{FsLifecycle, SweepReport};
pub use progress::{ProgressBus, StatusLog};

/// Capacity of the engine event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events surfaced by a codec engine while it works
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// One line of engine log output
    Log(String),
    /// Progress of the running invocation, already normalized to 0..=100
    Progress(u8),
}

/// Raw progress value as reported by an engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressSample {
    /// Fraction of work done, nominally 0..=1
    Ratio(f64),
    /// Percentage of work done, nominally 0..=100
    Percent(f64),
}

/// Normalize a progress sample to a single integer percent clamped to 0..=100
pub fn normalize_progress(sample: ProgressSample) -> u8 {
    let percent = match sample {
        ProgressSample::Ratio(ratio) => ratio * 100.0,
        ProgressSample::Percent(percent) => percent,
    };
    if !percent.is_finite() {
        return 0;
    }
    percent.round().clamp(0.0, 100.0) as u8
}

/// Broadcast side of an engine's event stream
#[derive(Debug, Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Emit a log line; blank lines are dropped
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() {
            return;
        }
        // No subscribers is not an error.
        let _ = self.sender.send(EngineEvent::Log(line));
    }

    pub fn progress(&self, sample: ProgressSample) {
        let _ = self.sender.send(EngineEvent::Progress(normalize_progress(sample)));
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a loaded engine
#[derive(Debug)]
pub struct EngineInfo {
    /// Version line reported by the engine
    pub version: String,
    /// Root of the engine's private filesystem
    pub workspace: PathBuf,
}

/// Handle to a loaded engine; clones share the same load
#[derive(Debug, Clone)]
pub struct EngineHandle {
    info: Arc<EngineInfo>,
}

impl EngineHandle {
    pub fn new(info: EngineInfo) -> Self {
        Self {
            info: Arc::new(info),
        }
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    pub fn workspace(&self) -> &PathBuf {
        &self.info.workspace
    }

    /// True if both handles come from the same load
    pub fn same_load(&self, other: &EngineHandle) -> bool {
        Arc::ptr_eq(&self.info, &other.info)
    }
}

/// Entry of an engine filesystem listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    /// `.` and `..`
    pub fn is_pseudo(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}
