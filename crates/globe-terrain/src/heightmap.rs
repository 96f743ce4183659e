//! Layered (fractal) simplex noise over the unit sphere.
//!
//! Composites several octaves of 3D simplex noise sampled directly at the
//! surface point, so there are no face seams. Each octave multiplies the
//! frequency by `lacunarity` and the amplitude by `gain`; the sum is then
//! scaled by `elevation` and shifted by `vertical_shift`.

use glam::Vec3;
use globe_config::NoiseLayerConfig;
use noise::{NoiseFn, Simplex};

/// One configured noise stack bound to a simplex permutation.
#[derive(Clone, Debug)]
pub struct LayeredNoise {
    noise: Simplex,
    settings: NoiseLayerConfig,
}

impl LayeredNoise {
    pub fn new(seed: u32, settings: NoiseLayerConfig) -> Self {
        Self {
            noise: Simplex::new(seed),
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &NoiseLayerConfig {
        &self.settings
    }

    /// Standard fBm sum, scaled and shifted.
    #[must_use]
    pub fn sample(&self, point: Vec3) -> f32 {
        self.accumulate(point, |n| n) * self.settings.elevation + self.settings.vertical_shift
    }

    /// Ridged variant: each octave contributes `(1 - |n|)²`, giving sharp
    /// crests where the noise crosses zero.
    #[must_use]
    pub fn sample_ridged(&self, point: Vec3) -> f32 {
        self.accumulate(point, |n| {
            let ridge = 1.0 - n.abs();
            ridge * ridge
        }) * self.settings.elevation
            + self.settings.vertical_shift
    }

    /// Geometric sum of the octave amplitudes before scaling.
    #[must_use]
    pub fn max_amplitude(&self) -> f32 {
        let mut sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.settings.layers {
            sum += amplitude;
            amplitude *= self.settings.gain;
        }
        sum
    }

    fn accumulate(&self, point: Vec3, shape: impl Fn(f64) -> f64) -> f32 {
        let s = &self.settings;
        let offset = Vec3::from_array(s.offset).as_dvec3();
        let base = point.as_dvec3() * f64::from(s.scale);

        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..s.layers {
            let p = base * frequency + offset;
            total += shape(self.noise.get([p.x, p.y, p.z])) * amplitude;
            frequency *= f64::from(s.lacunarity);
            amplitude *= f64::from(s.gain);
        }
        total as f32
    }
}
