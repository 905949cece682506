//! Playback controller.
//!
//! An [`Animator`] owns an [`SvgDocument`], analyzes the drawable tree below
//! its target, generates one animation per element and drives them on a
//! [`Timeline`] as a single unit.
//!
//! # Architecture
//!
//! ```text
//! Animator
//!   ├── rebuild: analyze → flatten → resolve config → create_animation
//!   ├── play: submit every animation, join finished signals in a TaskGroup
//!   ├── update: element-start/complete notifications, join resolution
//!   └── reset/destroy: cancel handles, restore style overrides
//! ```
//!
//! Control methods run synchronously. The only asynchronous piece is the
//! join over the handles' finished signals, which [`Animator::update`] polls
//! without blocking; control methods may be called between updates at any
//! time. A cycle torn down while the join is outstanding resolves as
//! [`PlaybackEvent::Cancelled`], never as an error.

pub mod events;
pub mod group;
pub mod state;

pub use events::{EventQueue, PlaybackEvent, DEFAULT_EVENT_CAPACITY};
pub use group::{GroupProgress, JoinOutcome, TaskGroup};
pub use state::{PlaybackPhase, PlaybackState};

use std::fmt;

use ego_tree::NodeId;

use crate::animations::{self, GeneratedAnimation};
use crate::config::{AnimatorConfig, AnimatorConfigUpdate, ElementAnimationConfig};
use crate::document::{StyleOverride, SvgDocument};
use crate::error::{MotionError, Result};
use crate::host::{DocumentGeometry, GeometryHost};
use crate::parser::{self, AnnotatedNode};
use crate::timeline::{SoftwareTimeline, Timeline, TimelineHandle};

/// Element tree a controller animates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The document's outermost `<svg>`.
    Root,
    /// First element matching a CSS selector.
    Selector(String),
    /// A node of the document.
    Node(NodeId),
}

type Callback = Box<dyn FnMut()>;
type ElementCallback = Box<dyn FnMut(NodeId, usize)>;

#[derive(Default)]
struct Callbacks {
    on_start: Option<Callback>,
    on_complete: Option<Callback>,
    on_element_start: Option<ElementCallback>,
    on_element_complete: Option<ElementCallback>,
}

/// A submitted element animation.
#[derive(Debug)]
struct RunningElement {
    handle: Box<dyn TimelineHandle>,
    node: NodeId,
    element_id: String,
    index: usize,
    delay_ms: f64,
    /// Delay plus active duration.
    end_ms: f64,
    started: bool,
}

/// Builder for [`Animator`].
pub struct AnimatorBuilder {
    document: SvgDocument,
    target: Target,
    config: AnimatorConfig,
    host: Option<Box<dyn GeometryHost>>,
    timeline: Option<Box<dyn Timeline>>,
    callbacks: Callbacks,
    event_capacity: usize,
}

impl AnimatorBuilder {
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn config(mut self, config: AnimatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Geometry host; defaults to [`DocumentGeometry`].
    pub fn geometry(mut self, host: impl GeometryHost + 'static) -> Self {
        self.host = Some(Box::new(host));
        self
    }

    pub fn timeline(mut self, timeline: impl Timeline + 'static) -> Self {
        self.timeline = Some(Box::new(timeline));
        self
    }

    pub fn on_start(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callbacks.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callbacks.on_complete = Some(Box::new(callback));
        self
    }

    /// Called with the element node and its position once its delay elapses.
    pub fn on_element_start(mut self, callback: impl FnMut(NodeId, usize) + 'static) -> Self {
        self.callbacks.on_element_start = Some(Box::new(callback));
        self
    }

    /// Called with the element node and its position when it finishes.
    pub fn on_element_complete(mut self, callback: impl FnMut(NodeId, usize) + 'static) -> Self {
        self.callbacks.on_element_complete = Some(Box::new(callback));
        self
    }

    /// Queue notifications for [`Animator::drain_events`]. On by default;
    /// hosts that only use callbacks can turn it off.
    pub fn queue_events(mut self, enabled: bool) -> Self {
        self.event_capacity = if enabled { DEFAULT_EVENT_CAPACITY } else { 0 };
        self
    }

    /// Queue at most `capacity` notifications, dropping the oldest beyond it.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Resolve the target, build the animations and, with `autoPlay`, start
    /// playing.
    pub fn build(self) -> Result<Animator> {
        let root = resolve_target(&self.document, &self.target)?;
        let timeline = self.timeline.unwrap_or_else(|| {
            tracing::debug!("no timeline supplied, using a detached software timeline");
            Box::new(SoftwareTimeline::new())
        });

        let mut animator = Animator {
            document: self.document,
            root,
            config: self.config,
            host: self.host.unwrap_or_else(|| Box::new(DocumentGeometry::new())),
            timeline,
            elements: Vec::new(),
            animations: Vec::new(),
            running: Vec::new(),
            cleanups: Vec::new(),
            completion: None,
            state: PlaybackState::default(),
            phase: PlaybackPhase::Idle,
            events: EventQueue::with_capacity(self.event_capacity),
            callbacks: self.callbacks,
        };
        animator.rebuild();

        if animator.config.auto_play {
            animator.play();
        }
        Ok(animator)
    }
}

fn resolve_target(document: &SvgDocument, target: &Target) -> Result<NodeId> {
    let node = match target {
        Target::Root => return Ok(document.root()),
        Target::Selector(selector) => document
            .select(selector)?
            .ok_or_else(|| MotionError::TargetNotFound(selector.clone()))?,
        Target::Node(node) => *node,
    };

    if document.is_svg_element(node) {
        Ok(node)
    } else {
        let description = match target {
            Target::Selector(selector) => selector.clone(),
            _ => format!("{node:?}"),
        };
        Err(MotionError::TargetNotFound(description))
    }
}

/// Playback controller over one element tree.
pub struct Animator {
    document: SvgDocument,
    root: NodeId,
    config: AnimatorConfig,
    host: Box<dyn GeometryHost>,
    timeline: Box<dyn Timeline>,
    /// Analyzed elements in flattened order.
    elements: Vec<AnnotatedNode>,
    /// Generated animations not yet submitted.
    animations: Vec<GeneratedAnimation>,
    running: Vec<RunningElement>,
    /// Style overrides of submitted animations, in acquisition order.
    cleanups: Vec<StyleOverride>,
    completion: Option<TaskGroup>,
    state: PlaybackState,
    phase: PlaybackPhase,
    events: EventQueue,
    callbacks: Callbacks,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("root", &self.root)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .field("elements", &self.elements.len())
            .field("pending", &self.animations.len())
            .field("running", &self.running.len())
            .field("cleanups", &self.cleanups.len())
            .finish_non_exhaustive()
    }
}

impl Animator {
    pub fn builder(document: SvgDocument) -> AnimatorBuilder {
        AnimatorBuilder {
            document,
            target: Target::Root,
            config: AnimatorConfig::default(),
            host: None,
            timeline: None,
            callbacks: Callbacks::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Parse `markup` and build a controller over its root `<svg>`.
    pub fn from_markup(
        markup: &str,
        config: AnimatorConfig,
        timeline: impl Timeline + 'static,
    ) -> Result<Self> {
        let document = SvgDocument::parse(markup)?;
        Self::builder(document).config(config).timeline(timeline).build()
    }

    pub fn document(&self) -> &SvgDocument {
        &self.document
    }

    /// The element whose descendants are animated.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Analyzed elements in flattened order.
    pub fn elements(&self) -> &[AnnotatedNode] {
        &self.elements
    }

    /// Generated animations waiting for `play`.
    pub fn pending_animations(&self) -> &[GeneratedAnimation] {
        &self.animations
    }

    /// Timeline handles held by the controller.
    pub fn handle_count(&self) -> usize {
        self.running.len()
    }

    /// Registered cleanup actions of submitted animations.
    pub fn cleanup_count(&self) -> usize {
        self.cleanups.len()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Nominal duration of one cycle: base duration plus one stagger step per
    /// element after the first.
    pub fn total_duration(&self) -> f64 {
        self.config.total_duration(self.elements.len())
    }

    /// Snapshot of the playback state with progress recomputed from the
    /// handles.
    pub fn state(&self) -> PlaybackState {
        let mut snapshot = self.state;
        let furthest = self
            .running
            .iter()
            .map(|element| element.handle.current_time())
            .reduce(f64::max);

        if let Some(furthest) = furthest {
            let total = self.total_duration();
            snapshot.elapsed_ms = furthest;
            snapshot.progress = if total > 0.0 {
                (furthest / total).clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
        if self.phase == PlaybackPhase::Completed {
            snapshot.progress = 1.0;
        }
        snapshot
    }

    /// Take every queued notification.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain().collect()
    }

    /// Notifications waiting in the queue.
    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    /// Start a cycle. No-op while playing or paused; a finished or
    /// interrupted cycle is rebuilt first.
    pub fn play(&mut self) {
        match self.phase {
            PlaybackPhase::Destroyed => {
                tracing::warn!("play called on a destroyed animator");
                return;
            }
            PlaybackPhase::Playing | PlaybackPhase::Paused => {
                tracing::debug!("play ignored, already playing");
                return;
            }
            PlaybackPhase::Completed | PlaybackPhase::Idle => {
                if !self.running.is_empty() {
                    self.reset();
                }
            }
        }

        self.state.is_playing = true;
        self.state.is_paused = false;
        self.phase = PlaybackPhase::Playing;
        self.emit(PlaybackEvent::Started);

        let mut group = TaskGroup::new();
        for (position, mut animation) in std::mem::take(&mut self.animations).into_iter().enumerate()
        {
            let mut handle =
                self.timeline
                    .submit(animation.target, &animation.keyframes, &animation.timing);
            if let Some(cleanup) = animation.take_cleanup() {
                self.cleanups.push(cleanup);
            }
            group.spawn(position, handle.finished());

            let index = self
                .elements
                .get(position)
                .map(|element| element.index)
                .unwrap_or(position);
            self.running.push(RunningElement {
                handle,
                node: animation.target,
                element_id: animation.element_id,
                index,
                delay_ms: animation.timing.delay_ms,
                end_ms: animation.timing.end_time(),
                started: false,
            });
        }
        self.completion = Some(group);

        tracing::debug!(
            elements = self.running.len(),
            total_ms = self.total_duration(),
            "playback started"
        );
    }

    /// Pause every handle. No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase != PlaybackPhase::Playing {
            tracing::debug!(phase = ?self.phase, "pause ignored");
            return;
        }
        for element in &mut self.running {
            element.handle.pause();
        }
        self.state.is_paused = true;
        self.phase = PlaybackPhase::Paused;
    }

    /// Resume every handle. No-op unless paused.
    pub fn resume(&mut self) {
        if self.phase != PlaybackPhase::Paused {
            tracing::debug!(phase = ?self.phase, "resume ignored");
            return;
        }
        for element in &mut self.running {
            element.handle.play();
        }
        self.state.is_paused = false;
        self.phase = PlaybackPhase::Playing;
    }

    /// Flip the direction of every handle. No-op unless a cycle is active.
    pub fn reverse(&mut self) {
        if !self.phase.is_active() {
            tracing::debug!(phase = ?self.phase, "reverse ignored, nothing playing");
            return;
        }
        let paused = self.phase == PlaybackPhase::Paused;
        for element in &mut self.running {
            element.handle.reverse();
            if paused {
                element.handle.pause();
            }
        }
    }

    /// Move every handle to `time_ms`. Playing/paused flags are unchanged.
    pub fn seek(&mut self, time_ms: f64) {
        if self.phase == PlaybackPhase::Destroyed {
            tracing::warn!("seek called on a destroyed animator");
            return;
        }
        for element in &mut self.running {
            element.handle.set_current_time(time_ms);
        }
        self.state.elapsed_ms = time_ms;
    }

    /// Cancel every handle, undo style overrides and rebuild fresh animations.
    pub fn reset(&mut self) {
        if self.phase == PlaybackPhase::Destroyed {
            tracing::warn!("reset called on a destroyed animator");
            return;
        }
        self.teardown();
        self.state = PlaybackState::default();
        self.phase = PlaybackPhase::Idle;
        self.rebuild();
    }

    /// Tear down like `reset` without rebuilding. Terminal.
    pub fn destroy(&mut self) {
        if self.phase == PlaybackPhase::Destroyed {
            return;
        }
        self.teardown();
        self.elements.clear();
        self.state = PlaybackState::default();
        self.phase = PlaybackPhase::Destroyed;
        tracing::debug!("animator destroyed");
    }

    /// Merge `update` over the current configuration, then reset.
    pub fn update_config(&mut self, update: AnimatorConfigUpdate) {
        if self.phase == PlaybackPhase::Destroyed {
            tracing::warn!("update_config called on a destroyed animator");
            return;
        }
        self.config = self.config.merged(update);
        self.reset();
    }

    /// Cooperative scheduling point: raise element notifications and resolve
    /// the cycle once its join completes. Call once per frame.
    pub fn update(&mut self) {
        if !self.phase.is_active() {
            return;
        }

        let mut started = Vec::new();
        for element in &mut self.running {
            if !element.started && element.handle.current_time() >= element.delay_ms {
                element.started = true;
                started.push((element.delay_ms, element_event(element, false)));
            }
        }

        let progress = match self.completion.as_mut() {
            Some(group) => group.poll_progress(),
            None => GroupProgress::default(),
        };

        let mut completed = Vec::new();
        for position in progress.completed {
            let Some(element) = self.running.get_mut(position) else {
                continue;
            };
            if !element.started {
                element.started = true;
                started.push((element.delay_ms, element_event(element, false)));
            }
            completed.push((element.end_ms, element_event(element, true)));
        }

        // Within one update, notifications follow element timing rather than
        // submission order.
        started.sort_by(|a, b| a.0.total_cmp(&b.0));
        completed.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, event) in started.into_iter().chain(completed) {
            self.emit(event);
        }

        match progress.outcome {
            Some(JoinOutcome::Finished) => self.finish_cycle(),
            Some(JoinOutcome::Cancelled) => self.interrupt_cycle(),
            None => {}
        }
    }

    fn finish_cycle(&mut self) {
        self.completion = None;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.state.progress = 1.0;
        self.phase = PlaybackPhase::Completed;
        tracing::debug!("playback completed");
        self.emit(PlaybackEvent::Completed);

        if self.config.looping {
            self.reset();
            self.play();
        }
    }

    fn interrupt_cycle(&mut self) {
        self.completion = None;
        self.state.is_playing = false;
        self.state.is_paused = false;
        self.phase = PlaybackPhase::Idle;
        tracing::debug!("playback interrupted by a cancelled handle");
        self.emit(PlaybackEvent::Cancelled);
    }

    /// Analyze the tree and generate one animation per element.
    fn rebuild(&mut self) {
        let forest = parser::analyze(&self.document, self.root, self.host.as_ref());
        self.elements = parser::flatten(&forest);

        let mut animations = Vec::with_capacity(self.elements.len());
        for (position, element) in self.elements.iter().enumerate() {
            let config = ElementAnimationConfig::resolve(
                &self.config,
                self.config.elements.get(&element.id),
                position,
            );
            animations.push(animations::create_animation(
                &mut self.document,
                self.host.as_ref(),
                element,
                &config,
            ));
        }
        self.animations = animations;

        tracing::debug!(elements = self.elements.len(), "built animations");
    }

    /// Cancel every handle and restore every style override.
    fn teardown(&mut self) {
        for element in &mut self.running {
            element.handle.cancel();
        }
        if let Some(mut group) = self.completion.take() {
            if group.poll_progress().outcome == Some(JoinOutcome::Cancelled) {
                self.emit(PlaybackEvent::Cancelled);
            }
        }
        self.running.clear();

        for cleanup in self.cleanups.drain(..).rev() {
            cleanup.restore(&mut self.document);
        }
        for mut animation in std::mem::take(&mut self.animations).into_iter().rev() {
            if let Some(cleanup) = animation.take_cleanup() {
                cleanup.restore(&mut self.document);
            }
        }
    }

    fn emit(&mut self, event: PlaybackEvent) {
        match &event {
            PlaybackEvent::Started => {
                if let Some(callback) = self.callbacks.on_start.as_mut() {
                    callback();
                }
            }
            PlaybackEvent::Completed => {
                if let Some(callback) = self.callbacks.on_complete.as_mut() {
                    callback();
                }
            }
            PlaybackEvent::ElementStarted { node, index, .. } => {
                if let Some(callback) = self.callbacks.on_element_start.as_mut() {
                    callback(*node, *index);
                }
            }
            PlaybackEvent::ElementCompleted { node, index, .. } => {
                if let Some(callback) = self.callbacks.on_element_complete.as_mut() {
                    callback(*node, *index);
                }
            }
            PlaybackEvent::Cancelled => {}
        }
        self.events.push(event);
    }
}

fn element_event(element: &RunningElement, completed: bool) -> PlaybackEvent {
    let element_id = element.element_id.clone();
    if completed {
        PlaybackEvent::ElementCompleted {
            element_id,
            node: element.node,
            index: element.index,
        }
    } else {
        PlaybackEvent::ElementStarted {
            element_id,
            node: element.node,
            index: element.index,
        }
    }
}
