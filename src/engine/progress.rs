//! Progress/log bus: one latest progress value and a bounded newest-first build log

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::model::{StatusEntry, StatusSource};
use crate::engine::EngineEvent;

/// Default number of status lines kept
pub const DEFAULT_STATUS_CAPACITY: usize = 7;

/// Bounded, newest-first list of status entries
#[derive(Debug, Clone)]
pub struct StatusLog {
    entries: VecDeque<StatusEntry>,
    capacity: usize,
}

impl StatusLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry once over capacity
    pub fn push(&mut self, entry: StatusEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&StatusEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_CAPACITY)
    }
}

struct BusInner {
    log: Mutex<StatusLog>,
    progress: watch::Sender<u8>,
    status: broadcast::Sender<StatusEntry>,
}

/// Normalizes engine events and pipeline milestones for observers.
///
/// Progress is presented as the latest value only; it restarts from zero with
/// every segment encode, so observers must not assume it increases.
#[derive(Clone)]
pub struct ProgressBus {
    inner: Arc<BusInner>,
}

impl ProgressBus {
    pub fn new(capacity: usize) -> Self {
        let (progress, _) = watch::channel(0u8);
        let (status, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(BusInner {
                log: Mutex::new(StatusLog::new(capacity)),
                progress,
                status,
            }),
        }
    }

    /// Record a pipeline status line
    pub fn status(&self, label: impl Into<String>) -> StatusEntry {
        let entry = StatusEntry::new(label, StatusSource::Pipeline);
        info!("{}", entry.label);
        self.record(entry.clone());
        entry
    }

    /// Record one engine log line
    pub fn engine_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        debug!(target: "reelforge::engine", "{}", line);
        self.record(StatusEntry::new(line, StatusSource::Engine));
    }

    fn record(&self, entry: StatusEntry) {
        if let Ok(mut log) = self.inner.log.lock() {
            log.push(entry.clone());
        }
        let _ = self.inner.status.send(entry);
    }

    pub fn set_progress(&self, percent: u8) {
        self.inner.progress.send_replace(percent.min(100));
    }

    /// Latest progress value
    pub fn progress(&self) -> u8 {
        *self.inner.progress.borrow()
    }

    pub fn watch_progress(&self) -> watch::Receiver<u8> {
        self.inner.progress.subscribe()
    }

    /// Live stream of every status entry recorded from now on
    pub fn subscribe_status(&self) -> broadcast::Receiver<StatusEntry> {
        self.inner.status.subscribe()
    }

    /// Snapshot of the bounded log, newest first
    pub fn entries(&self) -> Vec<StatusEntry> {
        self.inner
            .log
            .lock()
            .map(|log| log.entries())
            .unwrap_or_default()
    }

    /// True if any retained entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|entry| entry.label.contains(needle))
    }

    pub fn apply(&self, event: EngineEvent) {
        match event {
            EngineEvent::Log(line) => self.engine_line(&line),
            EngineEvent::Progress(percent) => self.set_progress(percent),
        }
    }

    /// Forward an engine event stream into the bus until the engine goes away
    pub fn attach(&self, mut events: broadcast::Receiver<EngineEvent>) -> JoinHandle<()> {
        let bus = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => bus.apply(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Progress bus skipped {} engine events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_CAPACITY)
    }
}
