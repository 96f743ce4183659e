//! The height/color function evaluated at every terrain vertex.

use glam::{Vec3, Vec4};
use globe_config::SurfaceConfig;
use tracing::debug;

use crate::{Crater, CraterProfile, LayeredNoise, crater_height, generate_craters};

/// Elevation and color of the surface along one direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    /// Offset from the unit sphere, as a fraction of the radius.
    pub elevation: f32,
    pub color: Vec4,
}

/// Maps a unit-sphere direction to an elevation and a color.
///
/// Implementations are shared across worker threads by the CPU evaluator.
pub trait SurfaceSampler: Send + Sync {
    fn sample(&self, direction: Vec3) -> SurfaceSample;

    /// Displaced vertex position and color for `direction`.
    fn displace(&self, direction: Vec3) -> (Vec3, Vec4) {
        let sample = self.sample(direction);
        (direction * (1.0 + sample.elevation), sample.color)
    }
}

/// Continents, ridges, ocean floor, craters, and an elevation color ramp
/// built from layered simplex noise.
#[derive(Clone, Debug)]
pub struct LayeredNoiseSurface {
    config: SurfaceConfig,
    shape: LayeredNoise,
    detail: LayeredNoise,
    ridge: LayeredNoise,
    ocean: LayeredNoise,
    color: LayeredNoise,
    craters: Vec<Crater>,
    profile: CraterProfile,
}

impl LayeredNoiseSurface {
    pub fn new(config: &SurfaceConfig) -> Self {
        let seed = noise_seed(config.seed);
        let craters = generate_craters(&config.craters, config.seed);
        debug!(seed = config.seed, craters = craters.len(), "Built layered noise surface");

        Self {
            shape: LayeredNoise::new(seed, config.shape),
            detail: LayeredNoise::new(seed, config.detail),
            ridge: LayeredNoise::new(seed, config.ridge),
            ocean: LayeredNoise::new(seed, config.ocean),
            color: LayeredNoise::new(seed, config.color),
            craters,
            profile: CraterProfile::from(&config.craters),
            config: config.clone(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    #[must_use]
    pub fn craters(&self) -> &[Crater] {
        &self.craters
    }

    #[must_use]
    pub fn crater_profile(&self) -> &CraterProfile {
        &self.profile
    }

    /// Elevation before coloring.
    #[must_use]
    pub fn elevation(&self, direction: Vec3) -> f32 {
        let shape = self.shape.sample(direction);
        let detail = self.detail.sample(direction);
        let ridge = self.ridge.sample_ridged(direction);
        let continents = shape + detail + ridge * shape.max(0.0);

        let elevation = continents + crater_height(direction, &self.craters, &self.profile);
        let floor = -self.config.ocean_floor + self.ocean.sample(direction);
        elevation.max(floor)
    }

    /// Blend between the low and high colors by elevation.
    #[must_use]
    pub fn color_at(&self, direction: Vec3, elevation: f32) -> Vec4 {
        let c = &self.config;
        let t = ((elevation - c.blend_height + self.color.sample(direction)) * c.blend_width + 0.5)
            .clamp(0.0, 1.0);
        Vec4::from_array(c.color_low).lerp(Vec4::from_array(c.color_high), t)
    }
}

impl SurfaceSampler for LayeredNoiseSurface {
    fn sample(&self, direction: Vec3) -> SurfaceSample {
        let elevation = self.elevation(direction);
        SurfaceSample {
            elevation,
            color: self.color_at(direction, elevation),
        }
    }
}

/// Fold a 64-bit seed into the 32-bit permutation seed `noise` expects.
#[must_use]
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use globe_config::{CraterConfig, NoiseLayerConfig};

    use super::*;

    fn flat_config() -> SurfaceConfig {
        let flat = NoiseLayerConfig {
            elevation: 0.0,
            ..Default::default()
        };
        SurfaceConfig {
            shape: flat,
            detail: flat,
            ridge: flat,
            ocean: flat,
            color: flat,
            ocean_floor: 1.0,
            craters: CraterConfig {
                count: 0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn directions() -> Vec<Vec3> {
        (0..100)
            .map(|i| {
                let t = i as f32 * 0.31;
                Vec3::new(t.cos(), (t * 0.7).sin(), (t * 1.3).cos()).normalize()
            })
            .collect()
    }

    #[test]
    fn test_flat_surface_is_unit_sphere() {
        let surface = LayeredNoiseSurface::new(&flat_config());
        for d in directions() {
            let (position, _) = surface.displace(d);
            assert!((position.length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_blend_width_gives_mid_color() {
        let config = SurfaceConfig {
            blend_width: 0.0,
            ..flat_config()
        };
        let surface = LayeredNoiseSurface::new(&config);
        let expected =
            Vec4::from_array(config.color_low).lerp(Vec4::from_array(config.color_high), 0.5);
        assert!((surface.sample(Vec3::Y).color - expected).length() < 1e-6);
    }

    #[test]
    fn test_color_clamped_to_ramp_ends() {
        let config = SurfaceConfig {
            blend_width: 100.0,
            ..flat_config()
        };
        let surface = LayeredNoiseSurface::new(&config);
        let high = Vec4::from_array(config.color_high);
        let low = Vec4::from_array(config.color_low);
        assert!((surface.color_at(Vec3::Y, 10.0) - high).length() < 1e-6);
        assert!((surface.color_at(Vec3::Y, -10.0) - low).length() < 1e-6);
    }

    #[test]
    fn test_ocean_floor_bounds_elevation() {
        let config = SurfaceConfig::default();
        let surface = LayeredNoiseSurface::new(&config);
        let ocean = LayeredNoise::new(noise_seed(config.seed), config.ocean);
        for d in directions() {
            let floor = -config.ocean_floor + ocean.sample(d);
            assert!(surface.elevation(d) >= floor);
        }
    }

    #[test]
    fn test_default_surface_is_deterministic_and_varied() {
        let a = LayeredNoiseSurface::new(&SurfaceConfig::default());
        let b = LayeredNoiseSurface::new(&SurfaceConfig::default());
        let samples: Vec<f32> = directions().into_iter().map(|d| a.elevation(d)).collect();
        for (d, &h) in directions().into_iter().zip(&samples) {
            assert_eq!(b.elevation(d), h);
            assert!(h.is_finite() && h.abs() < 0.5);
        }
        let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
        let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(max > min);
    }

    #[test]
    fn test_craters_follow_seed() {
        let config = SurfaceConfig {
            seed: 12,
            craters: CraterConfig {
                count: 8,
                ..Default::default()
            },
            ..Default::default()
        };
        let surface = LayeredNoiseSurface::new(&config);
        assert_eq!(surface.craters().len(), 8);
        assert_eq!(surface.craters(), generate_craters(&config.craters, 12).as_slice());
    }

    #[test]
    fn test_noise_seed_folds_high_bits() {
        assert_eq!(noise_seed(5), 5);
        assert_ne!(noise_seed(1 << 40), 0);
    }
}
