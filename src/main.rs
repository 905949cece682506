use anyhow::{Context, Result, bail};
use rune_motion_config::MotionConfig;
use rune_motion_core::{Animator, PlaybackEvent, SoftwareTimeline, SvgDocument, Target};

/// Played when no input file is given.
const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 120">
  <g id="logo">
    <path id="outline" d="M10 10 H190 V110 H10 Z" fill="none" stroke="#222" stroke-width="2"/>
    <circle id="sun" cx="50" cy="50" r="20" fill="#f5a623"/>
    <rect id="ground" x="10" y="90" width="180" height="20" fill="#4a90e2"/>
    <text id="title" x="100" y="60">rune</text>
  </g>
</svg>"##;

struct Args {
    input: Option<String>,
    config: Option<String>,
    target: Option<String>,
    frame_ms: Option<f64>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        input: None,
        config: None,
        target: None,
        frame_ms: None,
        json: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            args.config = Some(path.to_string());
        } else if let Some(selector) = arg.strip_prefix("--target=") {
            args.target = Some(selector.to_string());
        } else if let Some(value) = arg.strip_prefix("--frame-ms=") {
            let frame_ms: f64 = value
                .parse()
                .with_context(|| format!("invalid --frame-ms value `{value}`"))?;
            args.frame_ms = Some(frame_ms);
        } else if arg == "--json" {
            args.json = true;
        } else if arg.starts_with("--") {
            bail!("unknown option `{arg}`");
        } else {
            args.input = Some(arg);
        }
    }
    Ok(args)
}

fn report(event: &PlaybackEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        PlaybackEvent::Started => log::info!("playback started"),
        PlaybackEvent::ElementStarted { element_id, index, .. } => {
            log::info!("element {index} ({element_id}) started")
        }
        PlaybackEvent::ElementCompleted { element_id, index, .. } => {
            log::info!("element {index} ({element_id}) completed")
        }
        PlaybackEvent::Completed => log::info!("playback completed"),
        PlaybackEvent::Cancelled => log::info!("playback cancelled"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let args = parse_args()?;
    let mut config = match &args.config {
        Some(path) => MotionConfig::load_from_file(path)?,
        None => MotionConfig::load_or_default(),
    };
    config.merge_with_env();
    if let Some(target) = args.target {
        config.playback.target = Some(target);
    }
    if let Some(frame_ms) = args.frame_ms {
        config.playback.frame_ms = frame_ms;
    }
    if args.json {
        config.playback.json_events = true;
    }
    if config.playback.frame_ms <= 0.0 {
        bail!("frame step must be positive, got {}", config.playback.frame_ms);
    }

    let input = args
        .input
        .map(std::path::PathBuf::from)
        .or_else(|| config.playback.input.clone());
    let markup = match &input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            log::info!("no input file given, playing the built-in sample");
            SAMPLE_SVG.to_string()
        }
    };

    let document = SvgDocument::parse(&markup).context("failed to parse SVG input")?;
    let target = match &config.playback.target {
        Some(selector) => Target::Selector(selector.clone()),
        None => Target::Root,
    };
    let timeline = SoftwareTimeline::new();
    let mut animator = Animator::builder(document)
        .target(target)
        .config(config.animation.clone())
        .timeline(timeline.clone())
        .build()
        .context("failed to build animator")?;

    log::info!(
        "animating {} elements over {} ms",
        animator.elements().len(),
        animator.total_duration()
    );
    if !config.animation.auto_play {
        animator.play();
    }

    let json = config.playback.json_events;
    let mut frames = 0;
    'frames: while frames < config.playback.max_frames {
        timeline.advance(config.playback.frame_ms);
        animator.update();
        frames += 1;

        for event in animator.drain_events() {
            report(&event, json)?;
            let finished = matches!(event, PlaybackEvent::Completed | PlaybackEvent::Cancelled);
            if finished && !config.animation.looping {
                break 'frames;
            }
        }
    }

    let state = animator.state();
    log::info!(
        "stopped after {frames} frames ({} ms): progress {:.2}",
        timeline.now(),
        state.progress
    );
    if json {
        println!("{}", serde_json::to_string(&state)?);
    }

    animator.destroy();
    Ok(())
}
