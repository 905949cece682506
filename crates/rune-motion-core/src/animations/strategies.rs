//! One keyframe generator per motion kind.
//!
//! Every strategy returns keyframes starting at offset 0 and ending at offset
//! 1. Strategies that need a baseline style before the timeline runs (dash
//! pattern, transform origin) write it through a [`StyleOverride`] and hand the
//! guard back as the animation's cleanup.

use crate::config::{ElementAnimationConfig, MotionKind, SlideDirection};
use crate::document::{StyleOverride, SvgDocument};
use crate::parser::AnnotatedNode;

use super::keyframes::Keyframe;
use super::types::{StyleProperty, TransformFunction};
use super::GeneratedAnimation;

/// Path length assumed by `draw` when the node has none.
pub const NOMINAL_PATH_LENGTH: f64 = 1000.0;

fn generated(
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
    motion: MotionKind,
    keyframes: Vec<Keyframe>,
    cleanup: Option<StyleOverride>,
) -> GeneratedAnimation {
    GeneratedAnimation {
        target: node.node,
        element_id: node.id.clone(),
        motion,
        keyframes,
        timing: config.timing(),
        cleanup,
    }
}

/// `transform-origin` at the node's centre, or the middle of its box when
/// its bounds are unknown.
fn center_origin(document: &mut SvgDocument, node: &AnnotatedNode) -> StyleOverride {
    let origin = match node.bounds {
        Some(bounds) => {
            let (cx, cy) = bounds.center();
            format!("{cx}px {cy}px")
        }
        None => "50% 50%".to_string(),
    };
    StyleOverride::apply(document, node.node, &[("transform-origin", origin)])
}

/// Trace the stroke: dash array and offset both start at the full length,
/// and the offset animates to zero.
pub fn draw(
    document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let length = node.path_length.unwrap_or_else(|| {
        tracing::trace!(id = %node.id, "no path length, drawing with nominal length");
        NOMINAL_PATH_LENGTH
    });

    let cleanup = StyleOverride::apply(
        document,
        node.node,
        &[
            ("stroke-dasharray", length.to_string()),
            ("stroke-dashoffset", length.to_string()),
        ],
    );
    let keyframes = vec![
        Keyframe::new(0.0).set(StyleProperty::StrokeDashoffset, length),
        Keyframe::new(1.0).set(StyleProperty::StrokeDashoffset, 0.0),
    ];
    generated(node, config, MotionKind::Draw, keyframes, Some(cleanup))
}

pub fn fade(
    _document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let keyframes = vec![
        Keyframe::new(0.0).set(StyleProperty::Opacity, 0.0),
        Keyframe::new(1.0).set(StyleProperty::Opacity, 1.0),
    ];
    generated(node, config, MotionKind::Fade, keyframes, None)
}

/// Grow from `scale_from` to `scale_to` around the node's centre.
///
/// Opacity starts at 0 only when the start scale is exactly 0.
pub fn scale(
    document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let cleanup = center_origin(document, node);
    let start_opacity = if config.scale_from == 0.0 { 0.0 } else { 1.0 };

    let keyframes = vec![
        Keyframe::new(0.0)
            .set(StyleProperty::Transform, TransformFunction::Scale(config.scale_from))
            .set(StyleProperty::Opacity, start_opacity),
        Keyframe::new(1.0)
            .set(StyleProperty::Transform, TransformFunction::Scale(config.scale_to))
            .set(StyleProperty::Opacity, 1.0),
    ];
    generated(node, config, MotionKind::Scale, keyframes, Some(cleanup))
}

pub fn slide(
    _document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let from = match config.slide_from {
        SlideDirection::Left => TransformFunction::TranslateX(-100.0),
        SlideDirection::Right => TransformFunction::TranslateX(100.0),
        SlideDirection::Top => TransformFunction::TranslateY(-100.0),
        SlideDirection::Bottom => TransformFunction::TranslateY(100.0),
    };

    let keyframes = vec![
        Keyframe::new(0.0)
            .set(StyleProperty::Transform, from)
            .set(StyleProperty::Opacity, 0.0),
        Keyframe::new(1.0)
            .set(StyleProperty::Transform, from.identity())
            .set(StyleProperty::Opacity, 1.0),
    ];
    generated(node, config, MotionKind::Slide, keyframes, None)
}

pub fn rotate(
    document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    let cleanup = center_origin(document, node);
    let keyframes = vec![
        Keyframe::new(0.0)
            .set(StyleProperty::Transform, TransformFunction::Rotate(config.rotate_from))
            .set(StyleProperty::Opacity, 0.0),
        Keyframe::new(1.0)
            .set(StyleProperty::Transform, TransformFunction::Rotate(config.rotate_to))
            .set(StyleProperty::Opacity, 1.0),
    ];
    generated(node, config, MotionKind::Rotate, keyframes, Some(cleanup))
}

/// Pop in with an overshoot: 0 → 1.2 → 0.9 → 1.
pub fn pulse(
    document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    const STEPS: [(f64, f64, f64); 4] = [
        (0.0, 0.0, 0.0),
        (0.5, 1.2, 1.0),
        (0.75, 0.9, 1.0),
        (1.0, 1.0, 1.0),
    ];

    let cleanup = center_origin(document, node);
    let keyframes = STEPS
        .iter()
        .map(|&(offset, factor, opacity)| {
            Keyframe::new(offset)
                .set(StyleProperty::Transform, TransformFunction::Scale(factor))
                .set(StyleProperty::Opacity, opacity)
        })
        .collect();
    generated(node, config, MotionKind::Pulse, keyframes, Some(cleanup))
}

/// Drop in from above and settle.
pub fn bounce(
    _document: &mut SvgDocument,
    node: &AnnotatedNode,
    config: &ElementAnimationConfig,
) -> GeneratedAnimation {
    const STEPS: [(f64, f64, f64); 5] = [
        (0.0, -100.0, 0.0),
        (0.6, 10.0, 1.0),
        (0.75, -5.0, 1.0),
        (0.9, 2.0, 1.0),
        (1.0, 0.0, 1.0),
    ];

    let keyframes = STEPS
        .iter()
        .map(|&(offset, percent, opacity)| {
            Keyframe::new(offset)
                .set(StyleProperty::Transform, TransformFunction::TranslateY(percent))
                .set(StyleProperty::Opacity, opacity)
        })
        .collect();
    generated(node, config, MotionKind::Bounce, keyframes, None)
}
