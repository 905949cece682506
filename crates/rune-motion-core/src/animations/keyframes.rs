//! Keyframes and timing options handed to a timeline.
//!
//! The timing model follows the Web Animations `animate()` options:
//! - `duration`, `delay`
//! - `iterations` (including `infinite`)
//! - `direction` (`normal`, `reverse`, `alternate`, `alternate-reverse`)
//! - `fill` (`none`, `forwards`, `backwards`, `both`)
//! - `easing`, applied to the progress of each iteration
//!
//! Keyframes are property-sparse: a property is interpolated between the
//! nearest keyframes that mention it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::easing::EasingFunction;
use super::interpolate::Interpolate;
use super::types::{StyleProperty, StyleValue};

/// How many times an animation should repeat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IterationRepr", into = "IterationRepr")]
pub enum IterationCount {
    /// Run the animation a specific number of times (can be fractional).
    Count(f64),
    /// Run the animation indefinitely.
    Infinite,
}

impl Default for IterationCount {
    fn default() -> Self {
        Self::Count(1.0)
    }
}

impl IterationCount {
    /// Iteration count as a number; `infinite` is `f64::INFINITY`.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Infinite => f64::INFINITY,
            Self::Count(count) => *count,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IterationRepr {
    Count(f64),
    Keyword(String),
}

impl TryFrom<IterationRepr> for IterationCount {
    type Error = String;

    fn try_from(repr: IterationRepr) -> Result<Self, Self::Error> {
        match repr {
            IterationRepr::Count(count) if count.is_finite() && count >= 0.0 => {
                Ok(Self::Count(count))
            }
            IterationRepr::Count(count) => {
                Err(format!("iteration count must be a non-negative number, got {count}"))
            }
            IterationRepr::Keyword(word) if word.eq_ignore_ascii_case("infinite") => {
                Ok(Self::Infinite)
            }
            IterationRepr::Keyword(word) => Err(format!("unknown iteration count `{word}`")),
        }
    }
}

impl From<IterationCount> for IterationRepr {
    fn from(count: IterationCount) -> Self {
        match count {
            IterationCount::Count(count) => Self::Count(count),
            IterationCount::Infinite => Self::Keyword("infinite".to_string()),
        }
    }
}

/// Direction of animation playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationDirection {
    /// Play animation forward each iteration.
    #[default]
    Normal,
    /// Play animation backward each iteration.
    Reverse,
    /// Alternate between forward and backward.
    Alternate,
    /// Alternate, starting with backward.
    AlternateReverse,
}

impl AnimationDirection {
    /// Determine if a specific iteration should play in reverse.
    pub fn is_reversed(&self, iteration: u64) -> bool {
        match self {
            Self::Normal => false,
            Self::Reverse => true,
            Self::Alternate => iteration % 2 == 1,
            Self::AlternateReverse => iteration % 2 == 0,
        }
    }
}

/// What values to apply before/after the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationFillMode {
    /// Don't apply any values outside the animation.
    None,
    /// Retain the final keyframe values after animation ends.
    #[default]
    Forwards,
    /// Apply the first keyframe values during the delay period.
    Backwards,
    /// Apply both forwards and backwards behavior.
    Both,
}

impl AnimationFillMode {
    /// Should apply values before animation starts (during delay)?
    pub fn applies_backwards(&self) -> bool {
        matches!(self, Self::Backwards | Self::Both)
    }

    /// Should retain values after animation ends?
    pub fn applies_forwards(&self) -> bool {
        matches!(self, Self::Forwards | Self::Both)
    }
}

/// A single keyframe: a fractional offset plus the property values at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Keyframe {
    /// Position in the animation timeline (0.0 to 1.0).
    pub offset: f64,
    /// Property values at this keyframe.
    #[serde(flatten)]
    pub values: BTreeMap<StyleProperty, StyleValue>,
}

impl Keyframe {
    /// Create a new keyframe at the given offset.
    pub fn new(offset: f64) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            values: BTreeMap::new(),
        }
    }

    /// Set a property value for this keyframe.
    pub fn set(mut self, property: StyleProperty, value: impl Into<StyleValue>) -> Self {
        self.values.insert(property, value.into());
        self
    }

    /// Get a property value from this keyframe.
    pub fn get(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.values.get(&property)
    }
}

/// Timing options for one submitted animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingOptions {
    /// Duration of one iteration in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    /// Delay before the first iteration in milliseconds.
    #[serde(rename = "delay")]
    pub delay_ms: f64,
    pub easing: EasingFunction,
    pub direction: AnimationDirection,
    #[serde(rename = "fill")]
    pub fill_mode: AnimationFillMode,
    pub iterations: IterationCount,
}

impl Default for TimingOptions {
    fn default() -> Self {
        Self {
            duration_ms: 1000.0,
            delay_ms: 0.0,
            easing: EasingFunction::EaseOut,
            direction: AnimationDirection::Normal,
            fill_mode: AnimationFillMode::Forwards,
            iterations: IterationCount::default(),
        }
    }
}

impl TimingOptions {
    /// Duration of all iterations, excluding the delay.
    pub fn active_duration(&self) -> f64 {
        let iterations = self.iterations.as_f64();
        if self.duration_ms <= 0.0 || iterations == 0.0 {
            0.0
        } else {
            self.duration_ms * iterations
        }
    }

    /// Delay plus active duration.
    pub fn end_time(&self) -> f64 {
        self.delay_ms.max(0.0) + self.active_duration()
    }
}

/// Keyframes paired with their timing, as a timeline holds them.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeEffect {
    /// Keyframes sorted by offset.
    pub keyframes: Vec<Keyframe>,
    pub timing: TimingOptions,
}

impl KeyframeEffect {
    pub fn new(keyframes: &[Keyframe], timing: TimingOptions) -> Self {
        let mut keyframes = keyframes.to_vec();
        keyframes.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { keyframes, timing }
    }

    /// Every property mentioned by at least one keyframe.
    pub fn animated_properties(&self) -> Vec<StyleProperty> {
        let mut props: Vec<StyleProperty> = self
            .keyframes
            .iter()
            .flat_map(|kf| kf.values.keys().copied())
            .collect();
        props.sort();
        props.dedup();
        props
    }

    /// Find the keyframes mentioning `property` that surround `offset`.
    ///
    /// Returns (from_keyframe, to_keyframe, local_progress) where local_progress
    /// is 0.0-1.0 between the two keyframes.
    pub fn find_keyframes(
        &self,
        property: StyleProperty,
        offset: f64,
    ) -> Option<(&Keyframe, &Keyframe, f64)> {
        let frames: Vec<&Keyframe> = self
            .keyframes
            .iter()
            .filter(|kf| kf.values.contains_key(&property))
            .collect();
        let first = *frames.first()?;
        let offset = offset.clamp(0.0, 1.0);

        let mut from_kf = first;
        let mut to_kf = first;
        for &kf in &frames {
            if kf.offset <= offset {
                from_kf = kf;
            }
            to_kf = kf;
            if kf.offset >= offset {
                break;
            }
        }

        let range = to_kf.offset - from_kf.offset;
        let local_progress = if range > 0.0 {
            (offset - from_kf.offset) / range
        } else {
            0.0
        };

        Some((from_kf, to_kf, local_progress))
    }

    /// Value of a property at an iteration progress (0.0 to 1.0, already
    /// direction-adjusted). The effect's easing is applied here.
    pub fn value_at(&self, property: StyleProperty, progress: f64) -> Option<StyleValue> {
        let eased = self.timing.easing.evaluate(progress);
        let (from_kf, to_kf, local_progress) = self.find_keyframes(property, eased)?;

        let from_value = from_kf.get(property)?;
        let to_value = to_kf.get(property).unwrap_or(from_value);
        Some(from_value.interpolate(to_value, local_progress))
    }
}
