//! Timeline capability.
//!
//! A [`Timeline`] plays keyframes on a node and returns a [`TimelineHandle`]
//! to control the running animation. Hosts with a native animation engine
//! implement these traits over it; [`SoftwareTimeline`] is a deterministic,
//! frame-stepped implementation used by the demo binary and the tests.

pub mod software;

pub use software::{SoftwareHandle, SoftwareTimeline};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ego_tree::NodeId;
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::animations::{Keyframe, TimingOptions};

/// Unique identifier for a submitted animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// Generate a new unique animation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current state of a submitted animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// Waiting out its delay.
    #[default]
    Pending,
    /// Actively running.
    Running,
    /// Paused by its handle.
    Paused,
    /// Completed normally.
    Finished,
    /// Cancelled before completion.
    Cancelled,
}

/// Host animation engine.
pub trait Timeline {
    /// Start playing `keyframes` on `target`.
    fn submit(
        &self,
        target: NodeId,
        keyframes: &[Keyframe],
        timing: &TimingOptions,
    ) -> Box<dyn TimelineHandle>;
}

/// Control over one running animation.
pub trait TimelineHandle: fmt::Debug {
    fn id(&self) -> AnimationId;
    fn pause(&mut self);
    /// Resume a paused animation, or restart a finished one.
    fn play(&mut self);
    /// Stop and discard the animation. Outstanding finished signals resolve
    /// as cancelled.
    fn cancel(&mut self);
    /// Flip the playback direction.
    fn reverse(&mut self);
    /// Local time in milliseconds, delay included.
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, time_ms: f64);
    fn play_state(&self) -> AnimationState;
    /// A signal resolving with `Ok(())` when the animation finishes and with
    /// `Err(Canceled)` when it is cancelled first.
    fn finished(&mut self) -> oneshot::Receiver<()>;
}
