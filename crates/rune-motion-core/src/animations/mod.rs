//! Animation strategy set.
//!
//! This module provides:
//! - **Keyframes and timing**: what a timeline is asked to play
//! - **Easing functions**: the named CSS timing curves
//! - **Strategies**: one keyframe generator per motion kind
//! - **Dispatch**: [`create_animation`], which resolves `auto` through
//!   [`determine_auto_motion`] and calls the matching strategy
//!
//! # Architecture
//!
//! ```text
//! AnnotatedNode + ElementAnimationConfig
//!   └── create_animation
//!         ├── determine_auto_motion (mode = auto)
//!         └── strategies::{draw, fade, scale, slide, rotate, pulse, bounce}
//!               └── GeneratedAnimation { keyframes, timing, cleanup }
//! ```

pub mod easing;
pub mod interpolate;
pub mod keyframes;
pub mod strategies;
pub mod types;

pub use easing::{EasingFunction, UnknownEasing};
pub use interpolate::Interpolate;
pub use keyframes::{
    AnimationDirection, AnimationFillMode, IterationCount, Keyframe, KeyframeEffect,
    TimingOptions,
};
pub use types::{StyleProperty, StyleValue, TransformFunction};

use ego_tree::NodeId;

use crate::config::{ElementAnimationConfig, MotionKind};
use crate::document::{StyleOverride, SvgDocument};
use crate::host::GeometryHost;
use crate::parser::{AnnotatedNode, ShapeKind};

/// Keyframes, timing and undo action produced for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnimation {
    pub target: NodeId,
    /// Stable id of the target from the analysis pass.
    pub element_id: String,
    /// Motion kind actually generated (never `auto`).
    pub motion: MotionKind,
    pub keyframes: Vec<Keyframe>,
    pub timing: TimingOptions,
    /// Transient style mutation to undo on teardown.
    pub cleanup: Option<StyleOverride>,
}

impl GeneratedAnimation {
    /// Detach the cleanup action, leaving `None` behind.
    pub fn take_cleanup(&mut self) -> Option<StyleOverride> {
        self.cleanup.take()
    }
}

/// Pick a motion kind from the node's shape and geometry.
///
/// Strokable outlines are drawn when they have a visible stroke and a known
/// length; basic closed shapes scale in; everything else fades.
pub fn determine_auto_motion(
    document: &SvgDocument,
    host: &dyn GeometryHost,
    node: &AnnotatedNode,
) -> MotionKind {
    match node.kind {
        ShapeKind::Path | ShapeKind::Line | ShapeKind::Polyline | ShapeKind::Polygon => {
            let stroked = host.computed_style(document, node.node).has_visible_stroke();
            if node.path_length.is_some() && stroked {
                MotionKind::Draw
            } else {
                MotionKind::Fade
            }
        }
        ShapeKind::Circle | ShapeKind::Ellipse | ShapeKind::Rect => MotionKind::Scale,
        _ => MotionKind::Fade,
    }
}

/// Generate the animation for one element.
pub fn create_animation(
    document: &mut SvgDocument,
    host: &dyn GeometryHost,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let motion = match config.mode {
        MotionKind::Auto => determine_auto_motion(document, host, node),
        kind => kind,
    };
    tracing::trace!(id = %node.id, requested = %config.mode, %motion, "generating animation");

    match motion {
        MotionKind::Draw => strategies::draw(document, node, config),
        MotionKind::Scale => strategies::scale(document, node, config),
        MotionKind::Slide => strategies::slide(document, node, config),
        MotionKind::Rotate => strategies::rotate(document, node, config),
        MotionKind::Pulse => strategies::pulse(document, node, config),
        MotionKind::Bounce => strategies::bounce(document, node, config),
        MotionKind::Fade | MotionKind::Auto => strategies::fade(document, node, config),
    }
}
