//! Animated style properties and their values.
//!
//! Keyframes carry a sparse mapping of [`StyleProperty`] to [`StyleValue`].
//! Property names serialize in the camelCase form timeline hosts expect
//! (`strokeDashoffset`), values as plain numbers or CSS transform text.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// A style property a strategy can animate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    Opacity,
    StrokeDashoffset,
    Transform,
}

impl StyleProperty {
    /// CSS property name, as written in a `style` attribute.
    pub fn css_name(&self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::StrokeDashoffset => "stroke-dashoffset",
            Self::Transform => "transform",
        }
    }
}

/// A single CSS transform function.
///
/// Rotation is in degrees, translation in percent of the element box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformFunction {
    Scale(f64),
    Rotate(f64),
    TranslateX(f64),
    TranslateY(f64),
}

impl TransformFunction {
    /// The identity of the same function kind.
    pub fn identity(&self) -> Self {
        match self {
            Self::Scale(_) => Self::Scale(1.0),
            Self::Rotate(_) => Self::Rotate(0.0),
            Self::TranslateX(_) => Self::TranslateX(0.0),
            Self::TranslateY(_) => Self::TranslateY(0.0),
        }
    }
}

impl fmt::Display for TransformFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scale(s) => write!(f, "scale({s})"),
            Self::Rotate(deg) => write!(f, "rotate({deg}deg)"),
            Self::TranslateX(pct) => write!(f, "translateX({pct}%)"),
            Self::TranslateY(pct) => write!(f, "translateY({pct}%)"),
        }
    }
}

/// Value of an animated property at one keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Transform(TransformFunction),
}

impl StyleValue {
    /// Try to extract a numeric value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Transform(_) => None,
        }
    }

    /// Try to extract a transform function.
    pub fn as_transform(&self) -> Option<TransformFunction> {
        match self {
            Self::Transform(function) => Some(*function),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Transform(function) => function.fmt(f),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<TransformFunction> for StyleValue {
    fn from(function: TransformFunction) -> Self {
        Self::Transform(function)
    }
}

impl Serialize for StyleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Transform(function) => serializer.collect_str(function),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_css_text() {
        assert_eq!(TransformFunction::Scale(0.0).to_string(), "scale(0)");
        assert_eq!(TransformFunction::Scale(1.2).to_string(), "scale(1.2)");
        assert_eq!(TransformFunction::Rotate(-180.0).to_string(), "rotate(-180deg)");
        assert_eq!(TransformFunction::TranslateX(-100.0).to_string(), "translateX(-100%)");
        assert_eq!(TransformFunction::TranslateY(2.0).to_string(), "translateY(2%)");
    }

    #[test]
    fn test_identity_keeps_kind() {
        assert_eq!(TransformFunction::Scale(0.3).identity(), TransformFunction::Scale(1.0));
        assert_eq!(TransformFunction::Rotate(90.0).identity(), TransformFunction::Rotate(0.0));
    }

    #[test]
    fn test_value_serialization() {
        let number = serde_json::to_value(StyleValue::Number(0.5)).unwrap();
        assert_eq!(number, serde_json::json!(0.5));

        let transform = serde_json::to_value(StyleValue::from(TransformFunction::Scale(0.0))).unwrap();
        assert_eq!(transform, serde_json::json!("scale(0)"));

        let property = serde_json::to_value(StyleProperty::StrokeDashoffset).unwrap();
        assert_eq!(property, serde_json::json!("strokeDashoffset"));
        assert_eq!(StyleProperty::StrokeDashoffset.css_name(), "stroke-dashoffset");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(StyleValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(StyleValue::Number(3.0).as_transform(), None);
        let rotate = StyleValue::Transform(TransformFunction::Rotate(10.0));
        assert_eq!(rotate.as_transform(), Some(TransformFunction::Rotate(10.0)));
        assert_eq!(rotate.to_string(), "rotate(10deg)");
    }
}
