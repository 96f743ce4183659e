//! View-angle LOD selection driven by a response curve.

use glam::Vec3;

use crate::ResponseCurve;

/// Selects a detail level per chunk from the cosine between the view
/// direction and the chunk's center direction.
#[derive(Clone, Debug)]
pub struct LodSelector {
    curve: ResponseCurve,
    max_levels: u8,
}

impl LodSelector {
    /// Create a selector producing levels in `0..max_levels`.
    ///
    /// # Panics
    ///
    /// Panics if `max_levels` is zero.
    pub fn new(curve: ResponseCurve, max_levels: u8) -> Self {
        assert!(max_levels > 0, "max_levels must be at least 1");
        Self { curve, max_levels }
    }

    #[must_use]
    pub fn curve(&self) -> &ResponseCurve {
        &self.curve
    }

    pub fn set_curve(&mut self, curve: ResponseCurve) {
        self.curve = curve;
    }

    /// Number of detail levels; valid levels are `0..max_levels`.
    #[must_use]
    pub fn max_levels(&self) -> u8 {
        self.max_levels
    }

    /// The level a chunk centered at `center` should use when viewed from
    /// `view`, or `None` if the curve yields a non-finite or out-of-range
    /// level.
    ///
    /// A view at the planet center contributes a zero direction, which
    /// evaluates the curve at 0.
    #[must_use]
    pub fn desired_level(&self, center: Vec3, view: Vec3) -> Option<u8> {
        let dot = view.normalize_or_zero().dot(center.normalize_or_zero());
        let t = self.curve.evaluate(dot).clamp(0.0, 1.0);
        let level = (t * f32::from(self.max_levels - 1)).floor();

        if !level.is_finite() || level < 0.0 || level >= f32::from(self.max_levels) {
            return None;
        }
        Some(level as u8)
    }

    /// Decide the level a chunk should be rebuilt at this frame.
    ///
    /// Returns `None` when the chunk is excluded or already at the desired
    /// level (unless `force` is set).
    #[must_use]
    pub fn select(&self, center: Vec3, current: Option<u8>, view: Vec3, force: bool) -> Option<u8> {
        let desired = self.desired_level(center, view)?;
        (force || current != Some(desired)).then_some(desired)
    }
}
