//! Piecewise-linear keyframe curves.

use globe_config::CurveKey;

/// A response curve defined by `(time, value)` keyframes.
///
/// Evaluation interpolates linearly between neighboring keys and holds the
/// first/last value outside the key range. An empty curve evaluates to 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build a curve from keyframes in any order. Keys with a non-finite
    /// time or value are ignored.
    pub fn new(keys: &[CurveKey]) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .iter()
            .copied()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// The identity ramp from `(0, 0)` to `(1, 1)`.
    pub fn linear() -> Self {
        Self::new(&[CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)])
    }

    /// Keyframes sorted by time.
    #[must_use]
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`. Returns NaN for a NaN input.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t.is_nan() {
            return f32::NAN;
        }
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // first.time < t < last.time, so 1 <= i < len.
        let i = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[i - 1];
        let b = self.keys[i];
        let f = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * f
    }
}

impl From<&[CurveKey]> for ResponseCurve {
    fn from(keys: &[CurveKey]) -> Self {
        Self::new(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(keys: &[(f32, f32)]) -> ResponseCurve {
        let keys: Vec<CurveKey> = keys.iter().map(|&(t, v)| CurveKey::new(t, v)).collect();
        ResponseCurve::new(&keys)
    }

    #[test]
    fn test_empty_curve_is_zero() {
        let c = ResponseCurve::default();
        assert_eq!(c.evaluate(-5.0), 0.0);
        assert_eq!(c.evaluate(0.5), 0.0);
    }

    #[test]
    fn test_single_key_is_constant() {
        let c = curve(&[(0.3, 0.7)]);
        assert_eq!(c.evaluate(-1.0), 0.7);
        assert_eq!(c.evaluate(0.3), 0.7);
        assert_eq!(c.evaluate(2.0), 0.7);
    }

    #[test]
    fn test_interpolates_between_keys() {
        let c = curve(&[(0.0, 0.0), (1.0, 2.0)]);
        assert!((c.evaluate(0.25) - 0.5).abs() < 1e-6);
        assert!((c.evaluate(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_range() {
        let c = curve(&[(0.2, 0.1), (0.8, 0.9)]);
        assert_eq!(c.evaluate(-1.0), 0.1);
        assert_eq!(c.evaluate(1.0), 0.9);
    }

    #[test]
    fn test_keys_are_sorted() {
        let c = curve(&[(1.0, 1.0), (-1.0, 0.0), (0.5, 0.25)]);
        let times: Vec<f32> = c.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![-1.0, 0.5, 1.0]);
        assert!((c.evaluate(0.75) - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_keys_dropped() {
        let c = curve(&[(f32::NAN, 1.0), (0.0, 0.0), (1.0, f32::INFINITY), (1.0, 1.0)]);
        assert_eq!(c.keys().len(), 2);
    }

    #[test]
    fn test_exact_key_times_hit_key_values() {
        let c = curve(&[(-1.0, 0.0), (0.6, 0.0), (0.9, 0.4), (0.98, 0.8), (1.0, 1.0)]);
        assert_eq!(c.evaluate(0.6), 0.0);
        assert!((c.evaluate(0.9) - 0.4).abs() < 1e-6);
        assert!((c.evaluate(0.98) - 0.8).abs() < 1e-6);
        assert_eq!(c.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_nan_input_is_nan() {
        assert!(ResponseCurve::linear().evaluate(f32::NAN).is_nan());
    }
}
