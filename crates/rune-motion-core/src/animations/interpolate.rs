//! Interpolation between keyframe values.

use super::types::{StyleValue, TransformFunction};

/// Trait for types that can be interpolated between two values.
///
/// When t = 0.0, returns self. When t = 1.0, returns `to`.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for TransformFunction {
    /// Functions of the same kind interpolate their argument. Mismatched
    /// kinds switch discretely at the midpoint.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Scale(a), Self::Scale(b)) => Self::Scale(lerp(*a, *b, t)),
            (Self::Rotate(a), Self::Rotate(b)) => Self::Rotate(lerp(*a, *b, t)),
            (Self::TranslateX(a), Self::TranslateX(b)) => Self::TranslateX(lerp(*a, *b, t)),
            (Self::TranslateY(a), Self::TranslateY(b)) => Self::TranslateY(lerp(*a, *b, t)),
            _ if t < 0.5 => *self,
            _ => *to,
        }
    }
}

impl Interpolate for StyleValue {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a.interpolate(b, t)),
            (Self::Transform(a), Self::Transform(b)) => Self::Transform(a.interpolate(b, t)),
            _ if t < 0.5 => *self,
            _ => *to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_f64_interpolation() {
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 0.0), 0.0));
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 0.5), 50.0));
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 1.0), 100.0));
    }

    #[test]
    fn test_f64_negative_interpolation() {
        assert!(approx_eq(500.0_f64.interpolate(&0.0, 0.25), 375.0));
        assert!(approx_eq((-100.0_f64).interpolate(&10.0, 0.5), -45.0));
    }

    #[test]
    fn test_transform_interpolation() {
        let from = TransformFunction::Scale(0.0);
        let to = TransformFunction::Scale(1.2);
        let mid = from.interpolate(&to, 0.5);
        assert!(matches!(mid, TransformFunction::Scale(s) if approx_eq(s, 0.6)));

        let from = TransformFunction::Rotate(-180.0);
        let to = TransformFunction::Rotate(0.0);
        assert!(matches!(from.interpolate(&to, 0.5), TransformFunction::Rotate(d) if approx_eq(d, -90.0)));
    }

    #[test]
    fn test_mismatched_kinds_switch_at_midpoint() {
        let from = StyleValue::Transform(TransformFunction::Scale(0.0));
        let to = StyleValue::Number(1.0);
        assert_eq!(from.interpolate(&to, 0.25), from);
        assert_eq!(from.interpolate(&to, 0.75), to);
    }
}
