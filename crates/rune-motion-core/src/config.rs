//! Controller configuration.
//!
//! [`AnimatorConfig`] is the global configuration of one controller. It is a
//! plain value: built once, handed to the controller, and replaced (never
//! edited in place) by [`AnimatorConfig::merged`] when an update arrives.
//! Per-element settings are resolved from three layers into an
//! [`ElementAnimationConfig`]:
//!
//! ```text
//! built-in default < global config < per-element override
//! delay = override delay + global delay + stagger × index
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animations::{
    AnimationDirection, AnimationFillMode, EasingFunction, IterationCount, TimingOptions,
};

/// A named motion effect, or `auto` to pick one from the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MotionKind {
    #[default]
    Auto,
    Draw,
    Fade,
    Scale,
    Slide,
    Rotate,
    Pulse,
    Bounce,
}

impl MotionKind {
    /// Look up a motion kind by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "draw" => Self::Draw,
            "fade" => Self::Fade,
            "scale" => Self::Scale,
            "slide" => Self::Slide,
            "rotate" => Self::Rotate,
            "pulse" => Self::Pulse,
            "bounce" => Self::Bounce,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Draw => "draw",
            Self::Fade => "fade",
            Self::Scale => "scale",
            Self::Slide => "slide",
            Self::Rotate => "rotate",
            Self::Pulse => "pulse",
            Self::Bounce => "bounce",
        }
    }
}

/// Unrecognized names fall back to `fade`.
impl From<String> for MotionKind {
    fn from(name: String) -> Self {
        Self::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(mode = %name, "unknown motion kind, using fade");
            Self::Fade
        })
    }
}

impl fmt::Display for MotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge a sliding element enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    #[default]
    Left,
    Right,
    #[serde(alias = "up")]
    Top,
    #[serde(alias = "down")]
    Bottom,
}

/// Settings for a single element, keyed by its stable id in
/// [`AnimatorConfig::elements`]. Unset fields inherit the global value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementOverride {
    pub mode: Option<MotionKind>,
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub easing: Option<EasingFunction>,
    pub direction: Option<AnimationDirection>,
    pub fill_mode: Option<AnimationFillMode>,
    pub iterations: Option<IterationCount>,
    pub slide_from: Option<SlideDirection>,
    pub scale_from: Option<f64>,
    pub scale_to: Option<f64>,
    pub rotate_from: Option<f64>,
    pub rotate_to: Option<f64>,
}

/// Global configuration of one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimatorConfig {
    /// Duration of each element's animation in milliseconds.
    pub duration: f64,
    /// Base delay added to every element in milliseconds.
    pub delay: f64,
    pub easing: EasingFunction,
    /// Delay between consecutive elements in milliseconds.
    pub stagger: f64,
    pub direction: AnimationDirection,
    pub fill_mode: AnimationFillMode,
    pub iterations: IterationCount,
    pub mode: MotionKind,
    /// Start playing as soon as the controller is built.
    pub auto_play: bool,
    /// Restart from the beginning after every completed cycle.
    #[serde(rename = "loop")]
    pub looping: bool,
    pub elements: BTreeMap<String, ElementOverride>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            duration: 1000.0,
            delay: 0.0,
            easing: EasingFunction::EaseOut,
            stagger: 100.0,
            direction: AnimationDirection::Normal,
            fill_mode: AnimationFillMode::Forwards,
            iterations: IterationCount::default(),
            mode: MotionKind::Auto,
            auto_play: true,
            looping: false,
            elements: BTreeMap::new(),
        }
    }
}

impl AnimatorConfig {
    /// Nominal duration of a whole cycle over `element_count` elements.
    pub fn total_duration(&self, element_count: usize) -> f64 {
        let extra = element_count.saturating_sub(1) as f64;
        self.duration + self.stagger * extra
    }

    /// A new configuration with `update` applied over this one.
    ///
    /// A provided element map replaces the current map wholesale.
    pub fn merged(&self, update: AnimatorConfigUpdate) -> Self {
        let current = self.clone();
        Self {
            duration: update.duration.unwrap_or(current.duration),
            delay: update.delay.unwrap_or(current.delay),
            easing: update.easing.unwrap_or(current.easing),
            stagger: update.stagger.unwrap_or(current.stagger),
            direction: update.direction.unwrap_or(current.direction),
            fill_mode: update.fill_mode.unwrap_or(current.fill_mode),
            iterations: update.iterations.unwrap_or(current.iterations),
            mode: update.mode.unwrap_or(current.mode),
            auto_play: update.auto_play.unwrap_or(current.auto_play),
            looping: update.looping.unwrap_or(current.looping),
            elements: update.elements.unwrap_or(current.elements),
        }
    }
}

/// A partial [`AnimatorConfig`]; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimatorConfigUpdate {
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub easing: Option<EasingFunction>,
    pub stagger: Option<f64>,
    pub direction: Option<AnimationDirection>,
    pub fill_mode: Option<AnimationFillMode>,
    pub iterations: Option<IterationCount>,
    pub mode: Option<MotionKind>,
    pub auto_play: Option<bool>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub elements: Option<BTreeMap<String, ElementOverride>>,
}

/// Fully resolved settings for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementAnimationConfig {
    pub mode: MotionKind,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub easing: EasingFunction,
    pub direction: AnimationDirection,
    pub fill_mode: AnimationFillMode,
    pub iterations: IterationCount,
    pub slide_from: SlideDirection,
    pub scale_from: f64,
    pub scale_to: f64,
    pub rotate_from: f64,
    pub rotate_to: f64,
}

impl Default for ElementAnimationConfig {
    fn default() -> Self {
        let timing = TimingOptions::default();
        Self {
            mode: MotionKind::Auto,
            duration_ms: timing.duration_ms,
            delay_ms: timing.delay_ms,
            easing: timing.easing,
            direction: timing.direction,
            fill_mode: timing.fill_mode,
            iterations: timing.iterations,
            slide_from: SlideDirection::Left,
            scale_from: 0.0,
            scale_to: 1.0,
            rotate_from: -180.0,
            rotate_to: 0.0,
        }
    }
}

impl ElementAnimationConfig {
    /// Resolve the settings of the element at `index` in flattened order.
    pub fn resolve(
        global: &AnimatorConfig,
        element: Option<&ElementOverride>,
        index: usize,
    ) -> Self {
        let defaults = Self::default();
        let empty = ElementOverride::default();
        let element = element.unwrap_or(&empty);

        Self {
            mode: element.mode.unwrap_or(global.mode),
            duration_ms: element.duration.unwrap_or(global.duration),
            delay_ms: element.delay.unwrap_or(0.0) + global.delay + global.stagger * index as f64,
            easing: element.easing.unwrap_or(global.easing),
            direction: element.direction.unwrap_or(global.direction),
            fill_mode: element.fill_mode.unwrap_or(global.fill_mode),
            iterations: element.iterations.unwrap_or(global.iterations),
            slide_from: element.slide_from.unwrap_or(defaults.slide_from),
            scale_from: element.scale_from.unwrap_or(defaults.scale_from),
            scale_to: element.scale_to.unwrap_or(defaults.scale_to),
            rotate_from: element.rotate_from.unwrap_or(defaults.rotate_from),
            rotate_to: element.rotate_to.unwrap_or(defaults.rotate_to),
        }
    }

    /// Timing options handed to the timeline.
    pub fn timing(&self) -> TimingOptions {
        TimingOptions {
            duration_ms: self.duration_ms,
            delay_ms: self.delay_ms,
            easing: self.easing,
            direction: self.direction,
            fill_mode: self.fill_mode,
            iterations: self.iterations,
        }
    }
}

static_assertions::assert_impl_all!(AnimatorConfig: Send, Sync, Clone);
static_assertions::assert_impl_all!(ElementAnimationConfig: Send, Sync);
