use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::adapters::{AppConfig, FFmpegAdapter, FFmpegConfig, TemplatePlanSource};
use crate::app::render_interactor::RenderInteractor;
use crate::domain::errors::DomainError;
use crate::engine::{ProgressBus, VideoProfile};
use crate::output::OutputSlot;
use crate::ports::{CodecEnginePort, PlanSourcePort, SlidePort};
use crate::slides::{load_typeface, SlideSynthesizer};

pub trait AppContainer: Send + Sync {
    fn render_interactor(&self) -> Arc<RenderInteractor>;
    fn plan_source(&self) -> Arc<dyn PlanSourcePort>;
}

/// Wires adapters into the interactor. Must be built inside a tokio runtime:
/// the bus subscribes to engine events on a spawned task.
pub struct DefaultAppContainer {
    plan_source: Arc<dyn PlanSourcePort>,
    render_interactor: Arc<RenderInteractor>,
    event_pump: JoinHandle<()>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let engine = Arc::new(FFmpegAdapter::new(FFmpegConfig {
            binary: config.engine.binary.clone(),
            scratch_dir: config.engine.scratch_dir.clone(),
        }));

        let face = load_typeface(
            config.slides.font_regular.as_deref(),
            config.slides.font_bold.as_deref(),
        )
        .map_err(|e| DomainError::ResourceUnavailable(e.to_string()))?;
        let slides = Arc::new(SlideSynthesizer::new(face));

        let profile = VideoProfile::vertical_short().with_threads(config.engine.threads);
        let bus = ProgressBus::new(config.log.status_capacity);

        Ok(Self::with_ports(
            engine as Arc<dyn CodecEnginePort>,
            slides as Arc<dyn SlidePort>,
            Arc::new(TemplatePlanSource::new()) as Arc<dyn PlanSourcePort>,
            bus,
            profile,
        ))
    }

    /// Build from already constructed ports
    pub fn with_ports(
        engine: Arc<dyn CodecEnginePort>,
        slides: Arc<dyn SlidePort>,
        plan_source: Arc<dyn PlanSourcePort>,
        bus: ProgressBus,
        profile: VideoProfile,
    ) -> Self {
        let event_pump = bus.attach(engine.subscribe());
        let render_interactor = Arc::new(RenderInteractor::new(
            engine,
            slides,
            bus,
            Arc::new(OutputSlot::new()),
            profile,
        ));

        Self {
            plan_source,
            render_interactor,
            event_pump,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn render_interactor(&self) -> Arc<RenderInteractor> {
        Arc::clone(&self.render_interactor)
    }

    fn plan_source(&self) -> Arc<dyn PlanSourcePort> {
        Arc::clone(&self.plan_source)
    }
}

impl Drop for DefaultAppContainer {
    fn drop(&mut self) {
        self.event_pump.abort();
    }
}
