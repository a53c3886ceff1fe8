mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use reelforge::adapters::TemplatePlanSource;
use reelforge::app::render_interactor::*;
use reelforge::app::{AppContainer, DefaultAppContainer, RenderInteractor};
use reelforge::domain::model::{PlanStyle, RenderPhase};
use reelforge::engine::{FsLifecycle, ProgressBus, VideoProfile};
use reelforge::output::OutputSlot;
use reelforge::ports::{CodecEnginePort, PlanSourcePort};
use reelforge::RenderError;

fn is_stitch(argv: &[String]) -> bool {
    argv.iter().any(|arg| arg == "concat")
}

#[tokio::test]
async fn test_segments_encode_in_order_then_stitch_once() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = ready_interactor(engine.clone(), sample_plan(&[2.0, 3.0, 4.0, 5.0])).await;

    let handle = interactor.render().await.unwrap();
    assert!(handle.is_live());

    let invocations = engine.invocations();
    assert_eq!(invocations.len(), 5);
    for (index, argv) in invocations[..4].iter().enumerate() {
        assert!(!is_stitch(argv));
        assert_eq!(argv.last().unwrap(), &format!("j1-segment-{}.mp4", index));
    }
    assert!(is_stitch(&invocations[4]));
    assert_eq!(interactor.phase(), RenderPhase::Complete);
}

#[tokio::test]
async fn test_end_to_end_two_segments() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = ready_interactor(engine.clone(), sample_plan(&[3.0, 4.5])).await;

    let handle = interactor.render().await.unwrap();
    let invocations = engine.invocations();
    assert_eq!(invocations.len(), 3);

    let duration_of = |argv: &Vec<String>| {
        let at = argv.iter().position(|arg| arg == "-t").unwrap();
        argv[at + 1].clone()
    };
    assert_eq!(duration_of(&invocations[0]), "3.00");
    assert_eq!(duration_of(&invocations[1]), "4.50");
    assert_eq!(
        &invocations[0][..6],
        &["-loop", "1", "-t", "3.00", "-i", "j1-slide-0.png"].map(String::from)
    );
    assert_eq!(
        invocations[2],
        ["-f", "concat", "-safe", "0", "-i", "j1-filelist.txt", "-c", "copy", "j1-short.mp4"]
            .map(String::from)
            .to_vec()
    );

    assert_eq!(handle.bytes().unwrap().as_ref(), b"mp4 from j1-filelist.txt");
    assert_eq!(interactor.output().current().unwrap().id(), handle.id());
    assert!(interactor.bus().contains(STATUS_DONE));
    assert!(interactor.bus().contains("Segment 2 locked."));
    // job files are gone once the output has been read back
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_manifest_lists_segments_in_order() {
    let engine = Arc::new(MemoryEngine::failing_on(3));
    let interactor = ready_interactor(engine.clone(), sample_plan(&[3.0, 4.5])).await;

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::Stitch { .. }));

    let manifest = engine.file("j1-filelist.txt").unwrap();
    assert_eq!(
        String::from_utf8(manifest).unwrap(),
        "file j1-segment-0.mp4\nfile j1-segment-1.mp4"
    );
    assert_eq!(interactor.phase(), RenderPhase::Failed);
}

#[tokio::test]
async fn test_failed_encode_stops_before_stitch() {
    let engine = Arc::new(MemoryEngine::failing_on(2));
    let interactor = ready_interactor(engine.clone(), sample_plan(&[3.0, 3.0, 3.0])).await;

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::SegmentEncode { index: 1, .. }));

    let invocations = engine.invocations();
    assert_eq!(invocations.len(), 2);
    assert!(!invocations.iter().any(|argv| is_stitch(argv)));
    assert_eq!(interactor.phase(), RenderPhase::Failed);
    assert!(interactor.bus().contains("Segment 2 failed to encode"));
    assert!(engine.has_file("j1-segment-0.mp4"));
    assert!(interactor.output().current().is_none());
    assert!(!interactor.is_rendering());
}

#[tokio::test]
async fn test_slide_failure_aborts_render() {
    let engine = Arc::new(MemoryEngine::new());
    let slides = Arc::new(StubSlides {
        fail_index: Some(0),
        ..StubSlides::default()
    });
    let interactor = interactor_with_slides(engine.clone(), slides);
    interactor.boot().await.unwrap();
    interactor.accept_plan(sample_plan(&[2.0])).unwrap();

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::SlideRender { index: 0, .. }));
    assert!(engine.invocations().is_empty());
    assert!(interactor.bus().contains("Slide 1 failed to render"));
}

#[tokio::test]
async fn test_empty_output_is_an_error() {
    let engine = Arc::new(MemoryEngine::with_empty_output());
    let interactor = ready_interactor(engine, sample_plan(&[2.0])).await;

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::OutputRead { .. }));
    assert!(interactor.output().current().is_none());
    assert_eq!(interactor.phase(), RenderPhase::Failed);
}

#[tokio::test]
async fn test_render_without_plan_is_rejected() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = interactor(engine.clone());
    interactor.boot().await.unwrap();
    let phase = interactor.phase();

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::NoPlan));
    assert!(err.is_rejection());
    assert_eq!(interactor.phase(), phase);
    assert!(interactor.bus().contains(STATUS_NEED_PLAN));
    assert!(engine.invocations().is_empty());
}

#[tokio::test]
async fn test_render_before_encoder_ready_is_rejected() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = interactor(engine.clone());
    interactor.accept_plan(sample_plan(&[2.0])).unwrap();

    let err = interactor.render().await.unwrap_err();
    assert!(matches!(err, RenderError::EncoderNotReady));
    assert_eq!(interactor.phase(), RenderPhase::PlanReady);
    assert!(interactor.bus().contains(STATUS_ENCODER_LOADING));
    assert!(engine.invocations().is_empty());
}

#[tokio::test]
async fn test_second_render_while_busy_is_rejected() {
    let engine = Arc::new(MemoryEngine::with_delay(Duration::from_millis(50)));
    let interactor = ready_interactor(engine.clone(), sample_plan(&[2.0, 2.0])).await;

    let (first, second) = tokio::join!(interactor.render(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        interactor.render().await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(RenderError::RenderBusy)));
    assert_eq!(engine.invocations().len(), 3);
    assert_eq!(interactor.phase(), RenderPhase::Complete);
}

#[tokio::test]
async fn test_new_plan_revokes_live_output() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = ready_interactor(engine, sample_plan(&[2.0])).await;

    let first = interactor.render().await.unwrap();
    assert!(first.is_live());

    interactor.accept_plan(sample_plan(&[1.0, 1.5])).unwrap();
    assert!(!first.is_live());
    assert!(interactor.output().current().is_none());
    assert_eq!(interactor.phase(), RenderPhase::PlanReady);

    let second = interactor.render().await.unwrap();
    assert!(second.is_live());
    assert!(!first.is_live());
    assert_ne!(first.url(), second.url());
}

#[tokio::test]
async fn test_at_most_one_live_output() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = ready_interactor(engine.clone(), sample_plan(&[2.0])).await;

    let first = interactor.render().await.unwrap();
    let second = interactor.render().await.unwrap();
    assert!(!first.is_live());
    assert!(second.is_live());
    // job-scoped names never collide between runs
    assert!(engine
        .invocations()
        .last()
        .unwrap()
        .contains(&"j2-short.mp4".to_string()));
}

#[tokio::test]
async fn test_invalid_plan_is_rejected() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = interactor(engine);
    let err = interactor.accept_plan(sample_plan(&[])).unwrap_err();
    assert!(matches!(err, RenderError::InvalidPlan(_)));
    assert!(interactor.plan().is_none());
    assert_eq!(interactor.phase(), RenderPhase::Idle);
}

#[tokio::test]
async fn test_boot_failure_can_be_retried() {
    let engine = Arc::new(MemoryEngine::with_failing_loads(1));
    let interactor = interactor(engine.clone());

    let err = interactor.boot().await.unwrap_err();
    assert!(matches!(err, RenderError::EncoderLoad { .. }));
    assert!(!interactor.is_encoder_ready());
    assert!(interactor.bus().contains(STATUS_ENCODER_FAILED));
    assert_eq!(interactor.phase(), RenderPhase::AwaitingEncoder);

    let handle = interactor.boot().await.unwrap();
    assert_eq!(handle.version(), "memory-engine 1.0");
    assert!(interactor.is_encoder_ready());
    assert_eq!(engine.load_attempts(), 2);
}

#[tokio::test]
async fn test_concurrent_loads_share_one_attempt() {
    let engine = Arc::new(MemoryEngine::new());
    let (a, b) = tokio::join!(engine.ensure_loaded(), engine.ensure_loaded());
    assert!(a.unwrap().same_load(&b.unwrap()));
    assert_eq!(engine.load_attempts(), 1);
}

#[tokio::test]
async fn test_stale_files_are_swept_before_render() {
    let engine = Arc::new(MemoryEngine::new());
    engine.put_file("segment-0.mp4", b"stale");
    engine.put_file("short.mp4", b"stale");
    let interactor = ready_interactor(engine.clone(), sample_plan(&[2.0])).await;

    interactor.render().await.unwrap();
    assert!(!engine.has_file("segment-0.mp4"));
    assert!(!engine.has_file("short.mp4"));
}

#[tokio::test]
async fn test_second_sweep_is_noop() {
    let engine = Arc::new(MemoryEngine::new());
    engine.put_file("a.png", b"x");
    engine.put_file("b.mp4", b"y");

    let lifecycle = FsLifecycle::new(engine.as_ref());
    let first = lifecycle.sweep().await;
    assert_eq!(first.removed, 2);
    let second = lifecycle.sweep().await;
    assert!(second.is_noop());
}

#[tokio::test]
async fn test_status_log_is_bounded_newest_first() {
    let engine = Arc::new(MemoryEngine::new());
    let interactor = RenderInteractor::new(
        engine,
        Arc::new(StubSlides::default()),
        ProgressBus::new(7),
        Arc::new(OutputSlot::new()),
        VideoProfile::vertical_short(),
    );
    interactor.boot().await.unwrap();
    interactor
        .accept_plan(sample_plan(&[1.0, 1.0, 1.0, 1.0, 1.0]))
        .unwrap();
    interactor.render().await.unwrap();

    let labels: Vec<String> = interactor
        .bus()
        .entries()
        .into_iter()
        .map(|entry| entry.label)
        .collect();
    assert_eq!(labels.len(), 7);
    assert_eq!(labels[0], STATUS_DONE);
    assert_eq!(labels[1], STATUS_STITCHING);
    assert_eq!(labels[2], "Segment 5 locked.");
    assert_eq!(labels[6], "Segment 1 locked.");
}

#[tokio::test]
async fn test_headline_is_plan_title() {
    let engine = Arc::new(MemoryEngine::new());
    let slides = Arc::new(StubSlides::default());
    let interactor = interactor_with_slides(engine, slides.clone());
    interactor.boot().await.unwrap();
    interactor.accept_plan(sample_plan(&[1.0, 2.0])).unwrap();
    interactor.render().await.unwrap();

    let headlines = slides.headlines.lock().unwrap().clone();
    assert_eq!(headlines, vec!["Test short".to_string(), "Test short".to_string()]);
}

#[tokio::test]
async fn test_container_forwards_engine_progress() {
    let engine = Arc::new(MemoryEngine::new());
    let container = DefaultAppContainer::with_ports(
        engine.clone(),
        Arc::new(StubSlides::default()),
        Arc::new(TemplatePlanSource::new()),
        ProgressBus::new(32),
        VideoProfile::vertical_short(),
    );
    let interactor = container.render_interactor();
    let mut progress = interactor.bus().watch_progress();

    interactor.boot().await.unwrap();
    let plan = container.plan_source().generate_plan("tea", PlanStyle::Story);
    let beats = plan.segment_count();
    interactor.accept_plan(plan).unwrap();
    interactor.render().await.unwrap();
    assert_eq!(engine.invocations().len(), beats + 1);

    tokio::time::timeout(Duration::from_secs(2), async {
        while *progress.borrow_and_update() != 100 {
            progress.changed().await.unwrap();
        }
    })
    .await
    .expect("engine progress never reached the bus");
}
