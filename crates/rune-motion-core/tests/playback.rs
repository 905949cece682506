use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rune_motion_core::animator::{EventQueue, DEFAULT_EVENT_CAPACITY};
use rune_motion_core::{
    Animator, AnimatorConfig, AnimatorConfigUpdate, FixedGeometry, MotionError, MotionKind,
    PlaybackEvent, PlaybackPhase, SoftwareTimeline, SvgDocument, Target,
};

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

const THREE_SHAPES: &str = r#"<svg viewBox="0 0 100 100">
    <rect id="box" x="0" y="0" width="10" height="10"/>
    <circle id="dot" cx="50" cy="50" r="5"/>
    <path id="line" d="M0 0 L100 0" stroke="black"/>
</svg>"#;

fn build(config: AnimatorConfig) -> (Animator, SoftwareTimeline) {
    let timeline = SoftwareTimeline::new();
    let document = SvgDocument::parse(THREE_SHAPES).unwrap();
    let geometry = FixedGeometry::new().with_length("line", 500.0);
    let animator = Animator::builder(document)
        .config(config)
        .geometry(geometry)
        .timeline(timeline.clone())
        .build()
        .unwrap();
    (animator, timeline)
}

fn manual() -> AnimatorConfig {
    AnimatorConfig {
        auto_play: false,
        ..AnimatorConfig::default()
    }
}

fn count(events: &[PlaybackEvent], wanted: &PlaybackEvent) -> usize {
    events.iter().filter(|event| *event == wanted).count()
}

#[test]
fn test_stagger_delays_and_total_duration() {
    let (animator, _) = build(manual());
    let delays: Vec<f64> = animator
        .pending_animations()
        .iter()
        .map(|animation| animation.timing.delay_ms)
        .collect();
    assert_eq!(delays, vec![0.0, 100.0, 200.0]);
    assert!(approx_eq(animator.total_duration(), 1200.0));
}

#[test]
fn test_full_cycle_events_in_order() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    assert_eq!(animator.phase(), PlaybackPhase::Playing);

    timeline.advance(50.0);
    animator.update();
    let events = animator.drain_events();
    assert_eq!(events.first(), Some(&PlaybackEvent::Started));
    assert_eq!(
        events.iter().filter(|event| matches!(event, PlaybackEvent::ElementStarted { .. })).count(),
        1
    );

    timeline.advance(1150.0);
    animator.update();
    let events = animator.drain_events();
    let completed: Vec<usize> = events
        .iter()
        .filter(|event| matches!(event, PlaybackEvent::ElementCompleted { .. }))
        .filter_map(PlaybackEvent::index)
        .collect();
    assert_eq!(completed.len(), 3);
    assert_eq!(events.last(), Some(&PlaybackEvent::Completed));

    let state = animator.state();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
    assert!(!state.is_playing);
    assert!(approx_eq(state.progress, 1.0));
}

#[test]
fn test_element_start_precedes_its_completion() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    // Jump straight past the end so start and completion surface together.
    timeline.advance(5000.0);
    animator.update();

    let mut queue = EventQueue::new();
    for event in animator.drain_events() {
        queue.push(event);
    }
    for id in ["box", "dot", "line"] {
        let events = queue.events_for_element(id);
        assert_eq!(events.len(), 2, "{id}");
        assert!(matches!(events[0], PlaybackEvent::ElementStarted { .. }));
        assert!(matches!(events[1], PlaybackEvent::ElementCompleted { .. }));
    }
}

#[test]
fn test_progress_tracks_furthest_element() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(600.0);
    animator.update();

    let state = animator.state();
    assert!(state.is_playing);
    assert!(approx_eq(state.elapsed_ms, 600.0));
    assert!(approx_eq(state.progress, 0.5));
}

#[test]
fn test_pause_and_resume() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(300.0);
    animator.pause();
    assert_eq!(animator.phase(), PlaybackPhase::Paused);
    assert!(animator.state().is_paused);
    assert!(animator.state().is_playing);

    timeline.advance(2000.0);
    animator.update();
    assert!(approx_eq(animator.state().elapsed_ms, 300.0));
    assert!(!animator.drain_events().contains(&PlaybackEvent::Completed));

    // Pausing twice is harmless.
    animator.pause();
    animator.resume();
    assert_eq!(animator.phase(), PlaybackPhase::Playing);
    assert!(!animator.state().is_paused);

    timeline.advance(900.0);
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
}

#[test]
fn test_resume_without_pause_is_ignored() {
    let (mut animator, _) = build(manual());
    animator.resume();
    assert_eq!(animator.phase(), PlaybackPhase::Idle);
    animator.pause();
    assert_eq!(animator.phase(), PlaybackPhase::Idle);
}

#[test]
fn test_play_while_playing_is_noop() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    animator.play();
    assert_eq!(timeline.len(), 3);
    assert_eq!(count(&animator.drain_events(), &PlaybackEvent::Started), 1);
}

#[test]
fn test_seek_to_end_completes() {
    let (mut animator, _) = build(AnimatorConfig::default());
    animator.seek(1200.0);
    assert!(approx_eq(animator.state().elapsed_ms, 1200.0));

    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
    assert_eq!(count(&animator.drain_events(), &PlaybackEvent::Completed), 1);
}

#[test]
fn test_reverse_plays_back_to_start() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(500.0);
    animator.update();
    animator.reverse();

    timeline.advance(500.0);
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
}

#[test]
fn test_reverse_when_idle_is_ignored() {
    let (mut animator, timeline) = build(manual());
    animator.reverse();
    assert!(timeline.is_empty());
    assert_eq!(animator.phase(), PlaybackPhase::Idle);
}

#[test]
fn test_reset_restores_initial_state() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(400.0);
    animator.update();
    assert_eq!(animator.handle_count(), 3);
    assert!(animator.cleanup_count() > 0);

    animator.reset();
    assert_eq!(animator.handle_count(), 0);
    assert_eq!(animator.cleanup_count(), 0);
    assert_eq!(animator.phase(), PlaybackPhase::Idle);
    assert_eq!(animator.state(), Default::default());
    assert_eq!(animator.pending_animations().len(), 3);
    assert!(timeline.is_empty());
}

#[test]
fn test_interrupted_cycle_reports_cancelled() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(400.0);
    animator.update();
    animator.drain_events();

    animator.reset();
    let events = animator.drain_events();
    assert_eq!(count(&events, &PlaybackEvent::Cancelled), 1);
    assert_eq!(count(&events, &PlaybackEvent::Completed), 0);

    // A fresh cycle runs normally afterwards.
    animator.play();
    timeline.advance(1200.0);
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
}

#[test]
fn test_play_after_completion_starts_over() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    timeline.advance(1200.0);
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
    animator.drain_events();

    animator.play();
    assert_eq!(animator.phase(), PlaybackPhase::Playing);
    assert_eq!(animator.handle_count(), 3);
    assert_eq!(timeline.len(), 3);
    assert!(approx_eq(animator.state().elapsed_ms, 0.0));
}

#[test]
fn test_loop_restarts_after_completion() {
    let (mut animator, timeline) = build(AnimatorConfig {
        looping: true,
        ..AnimatorConfig::default()
    });

    timeline.advance(1200.0);
    animator.update();
    let events = animator.drain_events();
    let completed_at = events.iter().position(|event| *event == PlaybackEvent::Completed);
    let restarted_at = events.iter().rposition(|event| *event == PlaybackEvent::Started);
    assert!(completed_at.is_some());
    assert!(restarted_at > completed_at);
    assert_eq!(animator.phase(), PlaybackPhase::Playing);

    timeline.advance(1200.0);
    animator.update();
    assert_eq!(count(&animator.drain_events(), &PlaybackEvent::Completed), 1);
}

#[test]
fn test_draw_override_is_restored() {
    let (mut animator, _) = build(manual());
    let line = animator.document().select("#line").unwrap().unwrap();
    assert_eq!(animator.document().style(line, "stroke-dasharray"), Some("500"));
    assert_eq!(animator.document().style(line, "stroke-dashoffset"), Some("500"));

    animator.destroy();
    assert_eq!(animator.document().style(line, "stroke-dasharray"), None);
    assert_eq!(animator.document().style(line, "stroke-dashoffset"), None);
}

#[test]
fn test_preexisting_inline_style_survives_reset() {
    let markup = r#"<svg><rect id="r" width="4" height="4" style="transform-origin: 0 0"/></svg>"#;
    let mut animator = Animator::from_markup(markup, manual(), SoftwareTimeline::new()).unwrap();
    let rect = animator.document().select("#r").unwrap().unwrap();
    assert_eq!(animator.document().style(rect, "transform-origin"), Some("2px 2px"));

    animator.destroy();
    assert_eq!(animator.document().style(rect, "transform-origin"), Some("0 0"));
}

#[test]
fn test_destroy_mid_cycle_is_cancellation() {
    let completions = Rc::new(Cell::new(0));
    let on_complete = Rc::clone(&completions);
    let timeline = SoftwareTimeline::new();
    let mut animator = Animator::builder(SvgDocument::parse(THREE_SHAPES).unwrap())
        .timeline(timeline.clone())
        .on_complete(move || on_complete.set(on_complete.get() + 1))
        .build()
        .unwrap();

    timeline.advance(400.0);
    animator.update();
    animator.destroy();

    let events = animator.drain_events();
    assert_eq!(count(&events, &PlaybackEvent::Cancelled), 1);
    assert_eq!(count(&events, &PlaybackEvent::Completed), 0);
    assert_eq!(completions.get(), 0);

    timeline.advance(2000.0);
    animator.update();
    assert!(animator.drain_events().is_empty());
    assert_eq!(completions.get(), 0);
}

#[test]
fn test_destroy_is_terminal() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    animator.destroy();
    assert_eq!(animator.phase(), PlaybackPhase::Destroyed);
    assert!(animator.elements().is_empty());
    assert!(timeline.is_empty());

    animator.play();
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Destroyed);
    assert!(timeline.is_empty());
}

#[test]
fn test_update_config_rebuilds() {
    let (mut animator, timeline) = build(AnimatorConfig::default());
    animator.update_config(AnimatorConfigUpdate {
        duration: Some(200.0),
        stagger: Some(0.0),
        mode: Some(MotionKind::Fade),
        ..AnimatorConfigUpdate::default()
    });

    assert_eq!(animator.phase(), PlaybackPhase::Idle);
    assert!(timeline.is_empty());
    assert!(approx_eq(animator.total_duration(), 200.0));
    assert!(animator
        .pending_animations()
        .iter()
        .all(|animation| animation.motion == MotionKind::Fade));

    animator.play();
    timeline.advance(200.0);
    animator.update();
    assert_eq!(animator.phase(), PlaybackPhase::Completed);
}

#[test]
fn test_element_overrides_apply_by_id() {
    let mut config = manual();
    config.elements.insert(
        "dot".to_string(),
        serde_json::from_value(serde_json::json!({ "mode": "rotate", "delay": 50 })).unwrap(),
    );
    let (animator, _) = build(config);

    let dot = &animator.pending_animations()[1];
    assert_eq!(dot.element_id, "dot");
    assert_eq!(dot.motion, MotionKind::Rotate);
    assert!(approx_eq(dot.timing.delay_ms, 150.0));
}

#[test]
fn test_selector_target() {
    let markup = r#"<svg>
        <g id="logo"><rect width="1" height="1"/><rect width="2" height="2"/></g>
        <circle r="3"/>
    </svg>"#;
    let document = SvgDocument::parse(markup).unwrap();
    let animator = Animator::builder(document)
        .target(Target::Selector("#logo".to_string()))
        .config(manual())
        .build()
        .unwrap();
    assert_eq!(animator.elements().len(), 2);

    let document = SvgDocument::parse(markup).unwrap();
    let err = Animator::builder(document)
        .target(Target::Selector("#nothing".to_string()))
        .build()
        .unwrap_err();
    assert_eq!(err, MotionError::TargetNotFound("#nothing".to_string()));
}

#[test]
fn test_empty_tree_completes_immediately() {
    let timeline = SoftwareTimeline::new();
    let mut animator =
        Animator::from_markup("<svg></svg>", AnimatorConfig::default(), timeline).unwrap();
    assert!(approx_eq(animator.total_duration(), 1000.0));

    animator.update();
    let events = animator.drain_events();
    assert_eq!(events, vec![PlaybackEvent::Started, PlaybackEvent::Completed]);
}

#[test]
fn test_notifications_follow_element_timing() {
    let mut config = AnimatorConfig::default();
    config.elements.insert(
        "box".to_string(),
        serde_json::from_value(serde_json::json!({ "duration": 2000, "delay": 500 })).unwrap(),
    );
    config.elements.insert(
        "line".to_string(),
        serde_json::from_value(serde_json::json!({ "duration": 100 })).unwrap(),
    );

    let order = Rc::new(RefCell::new(Vec::new()));
    let completed = Rc::clone(&order);
    let timeline = SoftwareTimeline::new();
    let mut animator = Animator::builder(SvgDocument::parse(THREE_SHAPES).unwrap())
        .config(config)
        .geometry(FixedGeometry::new().with_length("line", 500.0))
        .timeline(timeline.clone())
        .on_element_complete(move |_, index| completed.borrow_mut().push(index))
        .build()
        .unwrap();

    // Delays 500/100/200, end times 2500/1100/300.
    timeline.advance(5000.0);
    animator.update();

    assert_eq!(*order.borrow(), vec![2, 1, 0]);

    let started: Vec<usize> = animator
        .drain_events()
        .iter()
        .filter(|event| matches!(event, PlaybackEvent::ElementStarted { .. }))
        .filter_map(PlaybackEvent::index)
        .collect();
    assert_eq!(started, vec![1, 2, 0]);
}

#[test]
fn test_looping_without_draining_stays_bounded() {
    let completions = Rc::new(Cell::new(0));
    let on_complete = Rc::clone(&completions);
    let timeline = SoftwareTimeline::new();
    let mut animator = Animator::builder(SvgDocument::parse(THREE_SHAPES).unwrap())
        .config(AnimatorConfig {
            looping: true,
            ..AnimatorConfig::default()
        })
        .timeline(timeline.clone())
        .on_complete(move || on_complete.set(on_complete.get() + 1))
        .build()
        .unwrap();

    for _ in 0..10_000 {
        timeline.advance(16.0);
        animator.update();
    }

    assert!(completions.get() > 100);
    assert!(animator.queued_events() <= DEFAULT_EVENT_CAPACITY);
}

#[test]
fn test_callback_only_host_queues_nothing() {
    let timeline = SoftwareTimeline::new();
    let mut animator = Animator::builder(SvgDocument::parse(THREE_SHAPES).unwrap())
        .config(AnimatorConfig {
            looping: true,
            ..AnimatorConfig::default()
        })
        .timeline(timeline.clone())
        .queue_events(false)
        .on_complete(|| {})
        .build()
        .unwrap();

    for _ in 0..200 {
        timeline.advance(16.0);
        animator.update();
    }
    assert_eq!(animator.queued_events(), 0);
}
