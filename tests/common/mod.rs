//! Shared test doubles for pipeline tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, OnceCell};

use reelforge::app::RenderInteractor;
use reelforge::domain::errors::DomainError;
use reelforge::domain::model::{Plan, Segment};
use reelforge::engine::{
    DirEntry, EngineEvent, EngineHandle, EngineInfo, EventEmitter, ProgressBus, ProgressSample,
    VideoProfile,
};
use reelforge::output::OutputSlot;
use reelforge::ports::{CodecEnginePort, SlidePort};
use reelforge::slides::SlideRenderError;

/// In-memory codec engine that records every invocation
#[derive(Default)]
pub struct MemoryEngine {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    invocations: Mutex<Vec<Vec<String>>>,
    loaded: OnceCell<EngineHandle>,
    load_attempts: AtomicUsize,
    failing_loads: AtomicUsize,
    /// 1-based invocation number that exits non-zero
    fail_on_invocation: Option<usize>,
    invoke_delay: Option<Duration>,
    empty_output: bool,
    events: EventEmitter,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(invocation: usize) -> Self {
        Self {
            fail_on_invocation: Some(invocation),
            ..Self::default()
        }
    }

    pub fn with_failing_loads(count: usize) -> Self {
        let engine = Self::default();
        engine.failing_loads.store(count, Ordering::SeqCst);
        engine
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            invoke_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_empty_output() -> Self {
        Self {
            empty_output: true,
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.lock().unwrap().contains_key(name)
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn put_file(&self, name: &str, bytes: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodecEnginePort for MemoryEngine {
    async fn ensure_loaded(&self) -> Result<EngineHandle, DomainError> {
        let handle = self
            .loaded
            .get_or_try_init(|| async {
                self.load_attempts.fetch_add(1, Ordering::SeqCst);
                let failing = self.failing_loads.load(Ordering::SeqCst);
                if failing > 0 {
                    self.failing_loads.store(failing - 1, Ordering::SeqCst);
                    return Err(DomainError::ResourceUnavailable(
                        "engine assets unreachable".to_string(),
                    ));
                }
                Ok(EngineHandle::new(EngineInfo {
                    version: "memory-engine 1.0".to_string(),
                    workspace: PathBuf::from("/"),
                }))
            })
            .await?;
        Ok(handle.clone())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        self.put_file(name, bytes);
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.file(name)
            .ok_or_else(|| DomainError::FileNotFound(name.to_string()))
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        self.files.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list_dir(&self, _path: &str) -> Result<Vec<DirEntry>, DomainError> {
        let mut entries = vec![DirEntry::dir("."), DirEntry::dir("..")];
        entries.extend(self.file_names().into_iter().map(DirEntry::file));
        Ok(entries)
    }

    async fn invoke(&self, argv: &[String]) -> Result<(), DomainError> {
        let number = {
            let mut invocations = self.invocations.lock().unwrap();
            invocations.push(argv.to_vec());
            invocations.len()
        };

        if let Some(delay) = self.invoke_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_invocation == Some(number) {
            return Err(DomainError::ProcessingError(format!(
                "invocation {} exited with status 1",
                number
            )));
        }

        let input = argv
            .windows(2)
            .find(|pair| pair[0] == "-i")
            .map(|pair| pair[1].clone())
            .ok_or_else(|| DomainError::BadArgs("no input".to_string()))?;
        if !self.has_file(&input) {
            return Err(DomainError::FileNotFound(input));
        }

        self.events.progress(ProgressSample::Ratio(0.5));
        self.events.progress(ProgressSample::Percent(100.0));

        let output = argv
            .last()
            .cloned()
            .ok_or_else(|| DomainError::BadArgs("no output".to_string()))?;
        let is_stitch = argv.iter().any(|arg| arg == "concat");
        let bytes = if is_stitch && self.empty_output {
            Vec::new()
        } else {
            format!("mp4 from {}", input).into_bytes()
        };
        self.put_file(&output, &bytes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

/// Slide renderer returning a fixed payload, optionally failing one index
#[derive(Default)]
pub struct StubSlides {
    pub fail_index: Option<usize>,
    pub headlines: Mutex<Vec<String>>,
}

#[async_trait]
impl SlidePort for StubSlides {
    async fn render(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        headline: &str,
    ) -> Result<Vec<u8>, SlideRenderError> {
        if self.fail_index == Some(index) {
            return Err(SlideRenderError::Surface {
                message: "surface unavailable".to_string(),
            });
        }
        self.headlines.lock().unwrap().push(headline.to_string());
        Ok(format!("png {} {}/{}", segment.id, index + 1, total).into_bytes())
    }
}

/// Plan with one segment per duration
pub fn sample_plan(durations: &[f64]) -> Plan {
    Plan {
        title: "Test short".to_string(),
        hook: "Watch this".to_string(),
        summary: "A plan used by tests".to_string(),
        cta: "Subscribe".to_string(),
        segments: durations
            .iter()
            .enumerate()
            .map(|(index, duration)| Segment {
                id: format!("beat-{}", index + 1),
                label: format!("Beat {}", index + 1),
                caption: format!("Caption {}", index + 1),
                narration: format!("Narration for beat {}", index + 1),
                visual_cue: "Gradient".to_string(),
                duration: *duration,
            })
            .collect(),
    }
}

pub fn interactor(engine: Arc<MemoryEngine>) -> RenderInteractor {
    interactor_with_slides(engine, Arc::new(StubSlides::default()))
}

pub fn interactor_with_slides(
    engine: Arc<MemoryEngine>,
    slides: Arc<dyn SlidePort>,
) -> RenderInteractor {
    RenderInteractor::new(
        engine,
        slides,
        ProgressBus::new(32),
        Arc::new(OutputSlot::new()),
        VideoProfile::vertical_short(),
    )
}

/// Interactor that has booted and accepted `plan`
pub async fn ready_interactor(engine: Arc<MemoryEngine>, plan: Plan) -> RenderInteractor {
    let interactor = interactor(engine);
    interactor.boot().await.unwrap();
    interactor.accept_plan(plan).unwrap();
    interactor
}
