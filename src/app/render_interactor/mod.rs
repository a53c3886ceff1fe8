// Render interactor - Orchestrates the storyboard-to-short render use case

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, info, warn};

use crate::domain::model::*;
use crate::domain::rules::PlanRules;
use crate::engine::commands::{concat_args, manifest_body};
use crate::engine::{EngineHandle, FsLifecycle, ProgressBus, VideoProfile};
use crate::error::{RenderError, RenderResult};
use crate::output::{AssetHandle, OutputSlot, DEFAULT_OUTPUT_NAME};
use crate::ports::*;

pub const STATUS_BOOTING: &str = "Booting encoder…";
pub const STATUS_ENCODER_READY: &str = "Encoder ready.";
pub const STATUS_ENCODER_FAILED: &str = "Unable to load encoder.";
pub const STATUS_PLAN_ACCEPTED: &str = "Storyboard refreshed with new beat map.";
pub const STATUS_NEED_PLAN: &str = "Generate a storyboard first.";
pub const STATUS_ENCODER_LOADING: &str = "Encoder still loading, one sec…";
pub const STATUS_BUSY: &str = "Render already in progress.";
pub const STATUS_RENDERING: &str = "Rendering slides for each beat…";
pub const STATUS_STITCHING: &str = "Stitching timeline…";
pub const STATUS_DONE: &str = "Short rendered, ready to download.";
pub const STATUS_FAILED: &str = "Render failed. Check logs for details.";

struct RenderState {
    phase: RenderPhase,
    plan: Option<Arc<Plan>>,
    encoder_ready: bool,
}

/// Clears the in-flight flag when a render ends, however it ends
struct RenderGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RenderGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Interactor driving one engine through boot, plan intake and renders.
///
/// Renders run one segment at a time: segment N's clip exists before slide
/// N+1 is synthesized, and every clip exists before the manifest is written.
pub struct RenderInteractor {
    engine: Arc<dyn CodecEnginePort>,
    slides: Arc<dyn SlidePort>,
    bus: ProgressBus,
    output: Arc<OutputSlot>,
    profile: VideoProfile,
    state: Mutex<RenderState>,
    rendering: AtomicBool,
    next_job: AtomicU64,
}

impl RenderInteractor {
    /// Create new render interactor with injected ports
    pub fn new(
        engine: Arc<dyn CodecEnginePort>,
        slides: Arc<dyn SlidePort>,
        bus: ProgressBus,
        output: Arc<OutputSlot>,
        profile: VideoProfile,
    ) -> Self {
        Self {
            engine,
            slides,
            bus,
            output,
            profile,
            state: Mutex::new(RenderState {
                phase: RenderPhase::Idle,
                plan: None,
                encoder_ready: false,
            }),
            rendering: AtomicBool::new(false),
            next_job: AtomicU64::new(0),
        }
    }

    pub fn bus(&self) -> &ProgressBus {
        &self.bus
    }

    pub fn output(&self) -> &OutputSlot {
        &self.output
    }

    pub fn phase(&self) -> RenderPhase {
        self.state().phase
    }

    pub fn plan(&self) -> Option<Arc<Plan>> {
        self.state().plan.clone()
    }

    pub fn is_encoder_ready(&self) -> bool {
        self.state().encoder_ready
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering.load(Ordering::Acquire)
    }

    /// Load the codec engine. A failed load may be retried.
    pub async fn boot(&self) -> RenderResult<EngineHandle> {
        {
            let mut state = self.state();
            if state.phase == RenderPhase::Idle {
                state.phase = RenderPhase::AwaitingEncoder;
            }
        }
        self.bus.status(STATUS_BOOTING);

        match self.engine.ensure_loaded().await {
            Ok(handle) => {
                self.state().encoder_ready = true;
                info!("Encoder loaded: {}", handle.version());
                self.bus.status(STATUS_ENCODER_READY);
                Ok(handle)
            }
            Err(e) => {
                error!("Encoder load failed: {}", e);
                self.bus.status(STATUS_ENCODER_FAILED);
                Err(RenderError::EncoderLoad {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Replace the current plan. The live output is revoked right away; a
    /// render already running keeps its own copy of the old plan.
    pub fn accept_plan(&self, plan: Plan) -> RenderResult<()> {
        PlanRules::validate(&plan).map_err(RenderError::InvalidPlan)?;

        self.output.revoke();
        let segments = plan.segment_count();
        {
            let mut state = self.state();
            state.plan = Some(Arc::new(plan));
            if !self.is_rendering() {
                state.phase = RenderPhase::PlanReady;
            }
        }
        info!("Accepted plan with {} segments", segments);
        self.bus.status(STATUS_PLAN_ACCEPTED);
        Ok(())
    }

    /// Render the current plan into a single MP4 and publish it
    pub async fn render(&self) -> RenderResult<AssetHandle> {
        let plan = {
            let state = self.state();
            let Some(plan) = state.plan.clone() else {
                drop(state);
                self.bus.status(STATUS_NEED_PLAN);
                return Err(RenderError::NoPlan);
            };
            if !state.encoder_ready {
                drop(state);
                self.bus.status(STATUS_ENCODER_LOADING);
                return Err(RenderError::EncoderNotReady);
            }
            plan
        };

        let Some(_guard) = RenderGuard::acquire(&self.rendering) else {
            warn!("Render requested while another render is running");
            self.bus.status(STATUS_BUSY);
            return Err(RenderError::RenderBusy);
        };

        let job_id = self.next_job.fetch_add(1, Ordering::Relaxed) + 1;
        let mut job = RenderJob::new(job_id, plan);
        info!("Starting render job {} ({} segments)", job_id, job.total_segments);

        match self.run_job(&mut job).await {
            Ok(handle) => {
                self.set_phase(RenderPhase::Complete);
                self.bus.status(STATUS_DONE);
                info!("Render job {} complete: {} bytes", job_id, handle.len());
                Ok(handle)
            }
            Err(e) => {
                self.set_phase(RenderPhase::Failed);
                self.bus.status(failure_status(&e));
                error!("Render job {} failed: {}", job_id, e);
                Err(e)
            }
        }
    }

    async fn run_job(&self, job: &mut RenderJob) -> RenderResult<AssetHandle> {
        let lifecycle = FsLifecycle::new(self.engine.as_ref());
        let swept = lifecycle.sweep().await;
        if !swept.is_noop() {
            debug!("Pre-render sweep removed {} files ({} failed)", swept.removed, swept.failed);
        }

        self.bus.set_progress(0);
        self.set_phase(RenderPhase::RenderingSegments);
        self.bus.status(STATUS_RENDERING);

        let names = job.names();
        let plan = Arc::clone(&job.plan);
        let total = plan.segment_count();

        for (index, segment) in plan.segments.iter().enumerate() {
            let slide = names.slide(index);
            let clip = names.segment(index);

            let png = self
                .slides
                .render(segment, index, total, &plan.title)
                .await
                .map_err(|source| RenderError::SlideRender { index, source })?;

            self.engine
                .write_file(&slide, &png)
                .await
                .map_err(|e| RenderError::SegmentEncode {
                    index,
                    message: format!("could not stage {}: {}", slide, e),
                })?;

            let argv = self
                .profile
                .segment_encode_args(&slide, &segment.duration_arg(), &clip);
            debug!("Encoding segment {}: {}", index, argv.join(" "));
            self.engine
                .invoke(&argv)
                .await
                .map_err(|e| RenderError::SegmentEncode {
                    index,
                    message: e.to_string(),
                })?;

            if let Err(e) = self.engine.delete_file(&slide).await {
                debug!("Ignoring failed delete of {}: {}", slide, e);
            }

            job.complete_segment(index);
            self.bus.status(format!("Segment {} locked.", index + 1));
        }

        job.phase = RenderPhase::Stitching;
        self.set_phase(RenderPhase::Stitching);

        let clips = names.segments(total);
        let manifest = names.manifest();
        let output = names.output();

        self.engine
            .write_file(&manifest, manifest_body(&clips).as_bytes())
            .await
            .map_err(|e| RenderError::Stitch {
                message: format!("could not write manifest: {}", e),
            })?;

        self.bus.status(STATUS_STITCHING);
        self.engine
            .invoke(&concat_args(&manifest, &output))
            .await
            .map_err(|e| RenderError::Stitch {
                message: e.to_string(),
            })?;

        let bytes = self
            .engine
            .read_file(&output)
            .await
            .map_err(|e| RenderError::OutputRead {
                message: e.to_string(),
            })?;
        if bytes.is_empty() {
            return Err(RenderError::OutputRead {
                message: format!("{} is empty", output),
            });
        }

        let handle = self.output.publish(DEFAULT_OUTPUT_NAME, bytes);

        let mut leftovers = clips;
        leftovers.push(manifest);
        leftovers.push(output);
        let cleaned = lifecycle.discard(leftovers).await;
        debug!("Post-render cleanup removed {} files ({} failed)", cleaned.removed, cleaned.failed);

        job.phase = RenderPhase::Complete;
        Ok(handle)
    }

    fn set_phase(&self, phase: RenderPhase) {
        self.state().phase = phase;
    }

    fn state(&self) -> MutexGuard<'_, RenderState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// User-facing status line for a failed render
fn failure_status(error: &RenderError) -> String {
    match error {
        RenderError::SlideRender { index, .. } => {
            format!("Slide {} failed to render. Check logs for details.", index + 1)
        }
        RenderError::SegmentEncode { index, .. } => {
            format!("Segment {} failed to encode. Check logs for details.", index + 1)
        }
        RenderError::Stitch { .. } => "Stitching failed. Check logs for details.".to_string(),
        RenderError::OutputRead { .. } => {
            "Rendered short could not be read back.".to_string()
        }
        _ => STATUS_FAILED.to_string(),
    }
}
