//! Command implementations

use std::future::Future;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::info;

use crate::adapters::plan_file::{render_plan, PlanFormat};
use crate::adapters::{
    load_plan, save_plan, AppConfig, FFmpegAdapter, FFmpegConfig, TemplatePlanSource,
};
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::{CheckArgs, PlanArgs, RenderArgs};
use crate::domain::model::{Plan, PlanStyle, StatusEntry, StatusSource};
use crate::engine::ProgressBus;
use crate::output::{OutputConfig, OutputWriter};
use crate::ports::{CodecEnginePort, PlanSourcePort};
use crate::utils::Utils;

/// Execute the plan command
pub async fn plan(args: PlanArgs) -> Result<()> {
    let style = PlanStyle::parse(&args.style)?;
    let source = TemplatePlanSource::new();
    let plan = source.generate_plan(&args.topic, style);
    let runtime = source.estimate_runtime(&plan.segments);
    info!("Generated {} plan with {} segments", style, plan.segment_count());

    match args.out {
        Some(path) => {
            save_plan(&plan, &path)
                .await
                .with_context(|| format!("Failed to write plan to {}", path.display()))?;
            println!("Plan: {}", plan.title);
            println!("Beats: {}", plan.segment_count());
            println!("Estimated runtime: {}", Utils::format_runtime(runtime));
            println!("Saved to {}", path.display());
        }
        None => {
            let format = PlanFormat::parse(&args.format)?;
            println!("{}", render_plan(&plan, format)?);
            eprintln!(
                "Estimated runtime: {} across {} beats",
                Utils::format_runtime(runtime),
                plan.segment_count()
            );
        }
    }
    Ok(())
}

/// Execute the render command
pub async fn render(args: RenderArgs, config: &AppConfig) -> Result<()> {
    let container = DefaultAppContainer::new(config).context("Failed to set up renderer")?;
    let plan = resolve_plan(&args, container.plan_source().as_ref()).await?;
    let interactor = container.render_interactor();
    let bus = interactor.bus().clone();

    println!(
        "Rendering \"{}\": {} beats, {}",
        plan.title,
        plan.segment_count(),
        Utils::format_runtime(container.plan_source().estimate_runtime(&plan.segments))
    );

    drive(&bus, interactor.boot())
        .await
        .context("Encoder unavailable")?;
    interactor.accept_plan(plan)?;

    let asset = drive(&bus, interactor.render())
        .await
        .context("Render failed")?;

    let output = OutputConfig::from(&config.output);
    let path = OutputWriter::new().write_asset(&asset, &output)?;
    println!(
        "Saved {} to {}",
        Utils::format_file_size(asset.len() as u64),
        path.display()
    );
    Ok(())
}

/// Execute the check command
pub async fn check(_args: CheckArgs, config: &AppConfig) -> Result<()> {
    let engine = FFmpegAdapter::new(FFmpegConfig {
        binary: config.engine.binary.clone(),
        scratch_dir: config.engine.scratch_dir.clone(),
    });
    let handle = engine
        .ensure_loaded()
        .await
        .with_context(|| format!("Unable to load {}", config.engine.binary.display()))?;

    println!("Encoder: {}", handle.version());
    println!("Binary: {}", config.engine.binary.display());
    println!("Threads: {}", config.engine.threads);
    Ok(())
}

async fn resolve_plan(args: &RenderArgs, source: &dyn PlanSourcePort) -> Result<Plan> {
    if let Some(path) = &args.plan {
        return load_plan(path)
            .await
            .with_context(|| format!("Failed to load plan {}", path.display()));
    }

    let topic = args.topic.as_deref().unwrap_or_default();
    let style = match &args.style {
        Some(style) => PlanStyle::parse(style)?,
        None => PlanStyle::Educational,
    };
    Ok(source.generate_plan(topic, style))
}

/// Await `task` while echoing pipeline status lines and coarse progress to stdout
async fn drive<F: Future>(bus: &ProgressBus, task: F) -> F::Output {
    let mut status = bus.subscribe_status();
    let mut progress = bus.watch_progress();
    let mut last_shown: Option<u8> = None;
    tokio::pin!(task);

    let result = loop {
        tokio::select! {
            result = &mut task => break result,
            Ok(entry) = status.recv() => print_status(&entry),
            Ok(()) = progress.changed() => {
                let percent = *progress.borrow_and_update();
                if should_show(last_shown, percent) {
                    println!("  {}", Utils::progress_bar(percent, 20));
                    last_shown = Some(percent);
                }
            }
        }
    };

    loop {
        match status.try_recv() {
            Ok(entry) => print_status(&entry),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    result
}

fn print_status(entry: &StatusEntry) {
    if entry.source == StatusSource::Pipeline {
        println!("{}", entry);
    }
}

/// Show every 25% step, restarts, and completion
fn should_show(last: Option<u8>, percent: u8) -> bool {
    match last {
        None => percent > 0,
        Some(last) => percent < last || percent >= last.saturating_add(25) || (percent == 100 && last != 100),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_show() {
        assert!(!should_show(None, 0));
        assert!(should_show(None, 10));
        assert!(!should_show(Some(10), 20));
        assert!(should_show(Some(10), 35));
        assert!(should_show(Some(90), 100));
        assert!(!should_show(Some(100), 100));
        assert!(should_show(Some(80), 5));
    }

    #[tokio::test]
    async fn test_drive_returns_task_output() {
        let bus = ProgressBus::new(7);
        let inner = bus.clone();
        let value = drive(&bus, async move {
            inner.status("working");
            inner.set_progress(50);
            42
        })
        .await;
        assert_eq!(value, 42);
        assert!(bus.contains("working"));
    }
}
