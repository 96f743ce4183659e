//! Impact craters: seeded placement and the bowl/rim height profile.

use glam::Vec3;
use globe_config::CraterConfig;
use globe_lod::ResponseCurve;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One crater, centered somewhere inside the unit sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crater {
    pub center: Vec3,
    pub radius: f32,
}

/// Shape parameters shared by every crater.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CraterProfile {
    pub rim_steepness: f32,
    pub rim_width: f32,
    pub floor_height: f32,
    pub smoothness: f32,
}

impl From<&CraterConfig> for CraterProfile {
    fn from(config: &CraterConfig) -> Self {
        Self {
            rim_steepness: config.rim_steepness,
            rim_width: config.rim_width,
            floor_height: config.floor_height,
            smoothness: config.smoothness,
        }
    }
}

/// Place `config.count` craters deterministically from `seed`.
///
/// Each radius is drawn uniformly from `[min_radius, max_radius]` and then
/// mapped through the size curve; each center is a uniform point inside the
/// unit sphere.
pub fn generate_craters(config: &CraterConfig, seed: u64) -> Vec<Crater> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let size_curve = ResponseCurve::new(&config.size_curve);
    let (lo, hi) = (config.min_radius, config.max_radius);

    (0..config.count)
        .map(|_| {
            let raw = if lo < hi { rng.random_range(lo..hi) } else { lo };
            Crater {
                radius: size_curve.evaluate(raw),
                center: inside_unit_sphere(&mut rng),
            }
        })
        .collect()
}

fn inside_unit_sphere(rng: &mut ChaCha8Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Polynomial smooth minimum with blend width `k`. `k <= 0` is a hard min.
#[must_use]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = ((b - a + k) / (2.0 * k)).clamp(0.0, 1.0);
    a * h + b * (1.0 - h) - k * h * (1.0 - h)
}

/// Polynomial smooth maximum with blend width `k`. `k <= 0` is a hard max.
#[must_use]
pub fn smooth_max(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.max(b);
    }
    -smooth_min(-a, -b, k)
}

/// Summed height offset of all craters at `point`.
///
/// Per crater, with `x = |point - center| / radius`: the bowl is `x² - 1`,
/// raised to `floor_height` and capped by a rim `rim_steepness *
/// min(x - 1 - rim_width, 0)²`. The result is scaled by the radius.
#[must_use]
pub fn crater_height(point: Vec3, craters: &[Crater], profile: &CraterProfile) -> f32 {
    let mut height = 0.0;
    for crater in craters {
        if crater.radius <= 0.0 {
            continue;
        }
        let x = point.distance(crater.center) / crater.radius;
        let cavity = x * x - 1.0;
        let rim_x = (x - 1.0 - profile.rim_width).min(0.0);
        let rim = profile.rim_steepness * rim_x * rim_x;

        let shape = smooth_max(cavity, profile.floor_height, profile.smoothness);
        let shape = smooth_min(shape, rim, profile.smoothness);
        height += shape * crater.radius;
    }
    height
}

#[cfg(test)]
mod tests {
    use globe_config::CurveKey;

    use super::*;

    fn config(count: u32) -> CraterConfig {
        CraterConfig {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate_craters(&config(50), 7), generate_craters(&config(50), 7));
        assert_ne!(generate_craters(&config(50), 7), generate_craters(&config(50), 8));
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(generate_craters(&config(0), 1).is_empty());
    }

    #[test]
    fn test_craters_inside_unit_sphere_with_radius_in_range() {
        let cfg = config(200);
        for crater in generate_craters(&cfg, 3) {
            assert!(crater.center.length() <= 1.0);
            assert!(crater.radius >= cfg.min_radius && crater.radius <= cfg.max_radius);
        }
    }

    #[test]
    fn test_size_curve_maps_radius() {
        let cfg = CraterConfig {
            count: 20,
            size_curve: vec![CurveKey::new(0.0, 0.5), CurveKey::new(1.0, 0.5)],
            ..Default::default()
        };
        assert!(generate_craters(&cfg, 1).iter().all(|c| c.radius == 0.5));
    }

    #[test]
    fn test_degenerate_radius_range() {
        let cfg = CraterConfig {
            count: 3,
            min_radius: 0.1,
            max_radius: 0.1,
            ..Default::default()
        };
        assert!(generate_craters(&cfg, 9).iter().all(|c| (c.radius - 0.1).abs() < 1e-6));
    }

    #[test]
    fn test_smooth_min_max_bounds() {
        for (a, b) in [(0.0, 1.0), (-2.0, 3.0), (0.4, 0.5), (1.0, 1.0)] {
            assert!(smooth_min(a, b, 0.5) <= a.min(b));
            assert!(smooth_max(a, b, 0.5) >= a.max(b));
            assert_eq!(smooth_min(a, b, 0.0), a.min(b));
            assert_eq!(smooth_max(a, b, 0.0), a.max(b));
        }
    }

    #[test]
    fn test_crater_center_is_depressed() {
        let craters = [Crater {
            center: Vec3::Y,
            radius: 0.1,
        }];
        let profile = CraterProfile::from(&CraterConfig::default());
        assert!(crater_height(Vec3::Y, &craters, &profile) < 0.0);
    }

    #[test]
    fn test_rim_is_raised() {
        let craters = [Crater {
            center: Vec3::ZERO,
            radius: 1.0,
        }];
        let profile = CraterProfile {
            rim_steepness: 1.0,
            rim_width: 0.7,
            floor_height: -0.3,
            smoothness: 0.0,
        };
        // Just outside the bowl the rim dominates.
        let h = crater_height(Vec3::new(1.1, 0.0, 0.0), &craters, &profile);
        assert!(h > 0.0, "{h}");
    }

    #[test]
    fn test_far_from_crater_is_flat() {
        let craters = [Crater {
            center: Vec3::Y,
            radius: 0.05,
        }];
        let profile = CraterProfile::from(&CraterConfig::default());
        assert_eq!(crater_height(Vec3::NEG_Y, &craters, &profile), 0.0);
    }

    #[test]
    fn test_zero_radius_placeholder_is_ignored() {
        let craters = [Crater {
            center: Vec3::ZERO,
            radius: 0.0,
        }];
        let profile = CraterProfile::from(&CraterConfig::default());
        assert_eq!(crater_height(Vec3::X, &craters, &profile), 0.0);
    }
}
