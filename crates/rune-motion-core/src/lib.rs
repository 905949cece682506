//! Staggered entrance animations for the drawable children of an SVG tree.
//!
//! ```text
//! SvgDocument ──▶ parser::analyze ──▶ animations::create_animation ──▶ Timeline
//!                                                                      │
//!                                 Animator (play/pause/seek/reset) ◀──┘
//! ```
//!
//! The crate has three layers:
//! - [`parser`] classifies the element tree into [`AnnotatedNode`]s
//! - [`animations`] turns each node into keyframes plus timing
//! - [`animator`] submits them to a [`Timeline`] and controls them as one unit
//!
//! Geometry comes from a [`GeometryHost`]; [`DocumentGeometry`] computes it
//! from element attributes, and hosts with a layout engine supply their own.

pub mod animations;
pub mod animator;
pub mod config;
pub mod document;
pub mod error;
pub mod host;
pub mod parser;
pub mod timeline;

pub use animations::{
    EasingFunction, GeneratedAnimation, Keyframe, KeyframeEffect, StyleProperty, StyleValue,
    TimingOptions, TransformFunction,
};
pub use animator::{Animator, AnimatorBuilder, PlaybackEvent, PlaybackPhase, PlaybackState, Target};
pub use config::{
    AnimatorConfig, AnimatorConfigUpdate, ElementAnimationConfig, ElementOverride, MotionKind,
    SlideDirection,
};
pub use document::{StyleOverride, SvgDocument};
pub use error::{MotionError, Result};
pub use host::{Bounds, DocumentGeometry, FixedGeometry, GeometryHost, StyleSnapshot};
pub use parser::{AnnotatedNode, ShapeKind};
pub use timeline::{AnimationState, SoftwareTimeline, Timeline, TimelineHandle};
