//! Frame-stepped reference timeline.
//!
//! Time only moves when [`SoftwareTimeline::advance`] is called, which makes
//! playback fully deterministic. Cloning the timeline shares its clock and
//! animation set, so a host can keep one clone to drive frames while a
//! controller submits through another.
//!
//! # Example
//!
//! ```
//! use rune_motion_core::animations::{Keyframe, StyleProperty, TimingOptions};
//! use rune_motion_core::document::SvgDocument;
//! use rune_motion_core::timeline::{AnimationState, SoftwareTimeline, Timeline, TimelineHandle};
//!
//! let document = SvgDocument::parse("<svg><rect/></svg>").unwrap();
//! let timeline = SoftwareTimeline::new();
//! let keyframes = [
//!     Keyframe::new(0.0).set(StyleProperty::Opacity, 0.0),
//!     Keyframe::new(1.0).set(StyleProperty::Opacity, 1.0),
//! ];
//! let handle = timeline.submit(document.root(), &keyframes, &TimingOptions::default());
//!
//! timeline.advance(1000.0);
//! assert_eq!(handle.play_state(), AnimationState::Finished);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ego_tree::NodeId;
use futures::channel::oneshot;

use crate::animations::{Keyframe, KeyframeEffect, StyleProperty, StyleValue, TimingOptions};

use super::{AnimationId, AnimationState, Timeline, TimelineHandle};

/// Deterministic timeline driven by explicit time steps.
#[derive(Debug, Clone, Default)]
pub struct SoftwareTimeline {
    inner: Rc<RefCell<TimelineInner>>,
}

#[derive(Debug, Default)]
struct TimelineInner {
    now_ms: f64,
    animations: BTreeMap<AnimationId, ActiveAnimation>,
}

#[derive(Debug)]
struct ActiveAnimation {
    target: NodeId,
    effect: KeyframeEffect,
    /// Local time, delay included.
    current_time: f64,
    /// 1.0 forwards, -1.0 after a reverse.
    playback_rate: f64,
    state: AnimationState,
    paused: bool,
    finished_senders: Vec<oneshot::Sender<()>>,
}

impl ActiveAnimation {
    fn new(target: NodeId, effect: KeyframeEffect) -> Self {
        let mut animation = Self {
            target,
            effect,
            current_time: 0.0,
            playback_rate: 1.0,
            state: AnimationState::Pending,
            paused: false,
            finished_senders: Vec::new(),
        };
        animation.settle();
        animation
    }

    fn end_time(&self) -> f64 {
        self.effect.timing.end_time()
    }

    fn play_state(&self) -> AnimationState {
        if self.paused && self.state != AnimationState::Finished {
            AnimationState::Paused
        } else {
            self.state
        }
    }

    fn update(&mut self, delta_ms: f64) {
        if self.paused || self.state == AnimationState::Finished {
            return;
        }
        self.current_time += delta_ms * self.playback_rate;
        self.settle();
    }

    /// Clamp the time into range and derive the state from it.
    fn settle(&mut self) {
        let end = self.end_time();
        self.current_time = self.current_time.clamp(0.0, end);

        let done = if self.playback_rate >= 0.0 {
            self.current_time >= end
        } else {
            self.current_time <= 0.0
        };

        if done {
            self.finish();
        } else if self.current_time < self.effect.timing.delay_ms {
            self.state = AnimationState::Pending;
        } else {
            self.state = AnimationState::Running;
        }
    }

    fn finish(&mut self) {
        self.state = AnimationState::Finished;
        for sender in self.finished_senders.drain(..) {
            let _ = sender.send(());
        }
    }

    /// Directed iteration progress at the current time, or `None` when the
    /// effect does not apply (outside the active interval without fill).
    fn progress(&self) -> Option<f64> {
        let timing = &self.effect.timing;
        let local = self.current_time - timing.delay_ms.max(0.0);
        let active = timing.active_duration();

        let after = local >= active;
        let overall = if local < 0.0 {
            if !timing.fill_mode.applies_backwards() {
                return None;
            }
            0.0
        } else if after {
            if !timing.fill_mode.applies_forwards() {
                return None;
            }
            timing.iterations.as_f64()
        } else {
            local / timing.duration_ms
        };

        let mut iteration = overall.floor();
        let mut fraction = overall - iteration;
        if after && fraction == 0.0 && overall > 0.0 {
            iteration -= 1.0;
            fraction = 1.0;
        }

        if timing.direction.is_reversed(iteration.max(0.0) as u64) {
            Some(1.0 - fraction)
        } else {
            Some(fraction)
        }
    }

    fn sample(&self, out: &mut BTreeMap<StyleProperty, StyleValue>) {
        let Some(progress) = self.progress() else {
            return;
        };
        for property in self.effect.animated_properties() {
            if let Some(value) = self.effect.value_at(property, progress) {
                out.insert(property, value);
            }
        }
    }
}

impl SoftwareTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and update every animation.
    pub fn advance(&self, delta_ms: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.now_ms += delta_ms;
        for animation in inner.animations.values_mut() {
            animation.update(delta_ms);
        }
    }

    /// Total time advanced so far.
    pub fn now(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Number of animations not yet finished.
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .animations
            .values()
            .filter(|animation| animation.state != AnimationState::Finished)
            .count()
    }

    /// Number of animations held, finished ones included.
    pub fn len(&self) -> usize {
        self.inner.borrow().animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effect values currently applied to `node`. Later submissions win.
    pub fn current_values(&self, node: NodeId) -> BTreeMap<StyleProperty, StyleValue> {
        let inner = self.inner.borrow();
        let mut values = BTreeMap::new();
        for animation in inner.animations.values().filter(|a| a.target == node) {
            animation.sample(&mut values);
        }
        values
    }
}

impl Timeline for SoftwareTimeline {
    fn submit(
        &self,
        target: NodeId,
        keyframes: &[Keyframe],
        timing: &TimingOptions,
    ) -> Box<dyn TimelineHandle> {
        let id = AnimationId::new();
        let animation = ActiveAnimation::new(target, KeyframeEffect::new(keyframes, *timing));
        self.inner.borrow_mut().animations.insert(id, animation);
        tracing::trace!(?id, ?target, "submitted animation");

        Box::new(SoftwareHandle {
            id,
            inner: Rc::clone(&self.inner),
        })
    }
}

/// Handle to an animation on a [`SoftwareTimeline`].
///
/// Cancelling removes the animation; the handle is inert afterwards.
#[derive(Debug)]
pub struct SoftwareHandle {
    id: AnimationId,
    inner: Rc<RefCell<TimelineInner>>,
}

impl SoftwareHandle {
    fn with<R>(&self, f: impl FnOnce(&mut ActiveAnimation) -> R) -> Option<R> {
        self.inner.borrow_mut().animations.get_mut(&self.id).map(f)
    }
}

impl TimelineHandle for SoftwareHandle {
    fn id(&self) -> AnimationId {
        self.id
    }

    fn pause(&mut self) {
        self.with(|animation| animation.paused = true);
    }

    fn play(&mut self) {
        self.with(|animation| {
            animation.paused = false;
            if animation.state == AnimationState::Finished {
                animation.current_time = if animation.playback_rate >= 0.0 {
                    0.0
                } else {
                    animation.end_time()
                };
                animation.state = AnimationState::Pending;
                animation.settle();
            }
        });
    }

    fn cancel(&mut self) {
        let removed = self.inner.borrow_mut().animations.remove(&self.id);
        if removed.is_some() {
            tracing::trace!(id = ?self.id, "cancelled animation");
        }
    }

    fn reverse(&mut self) {
        self.with(|animation| {
            animation.playback_rate = -animation.playback_rate;
            if animation.state == AnimationState::Finished {
                animation.state = AnimationState::Running;
            }
            animation.paused = false;
            animation.settle();
        });
    }

    fn current_time(&self) -> f64 {
        self.with(|animation| animation.current_time).unwrap_or(0.0)
    }

    fn set_current_time(&mut self, time_ms: f64) {
        self.with(|animation| {
            animation.current_time = time_ms;
            if animation.state == AnimationState::Finished {
                animation.state = AnimationState::Running;
            }
            animation.settle();
        });
    }

    fn play_state(&self) -> AnimationState {
        self.with(|animation| animation.play_state())
            .unwrap_or(AnimationState::Cancelled)
    }

    fn finished(&mut self) -> oneshot::Receiver<()> {
        let (sender, receiver) = oneshot::channel();
        self.with(|animation| {
            if animation.state == AnimationState::Finished {
                let _ = sender.send(());
            } else {
                animation.finished_senders.push(sender);
            }
        });
        // A cancelled handle drops the sender, which resolves the receiver as
        // cancelled.
        receiver
    }
}
