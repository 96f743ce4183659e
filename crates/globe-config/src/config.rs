//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deepest chunk recursion accepted; 6·4^8 = 393 216 chunks.
pub const MAX_RECURSION_LEVEL: u32 = 8;

/// Largest number of detail levels; the finest template has (2^9+1)² vertices.
pub const MAX_DETAIL_LEVELS: u8 = 10;

const CONFIG_FILE: &str = "config.ron";

/// Top-level terrain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk topology and LOD selection settings.
    pub mesh: MeshConfig,
    /// Height and color function parameters.
    pub surface: SurfaceConfig,
    /// Which batch evaluator backend to run.
    pub compute: ComputeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// A single keyframe of a piecewise-linear response curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Chunk topology and LOD selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Quadtree recursion depth. The planet has 6·4^depth chunks.
    /// Changing it regenerates every chunk.
    pub chunk_recursion_level: u32,
    /// Number of plane templates (LOD 0 through `max_detail_levels - 1`).
    pub max_detail_levels: u8,
    /// Detail as a function of the cosine between the view direction and a
    /// chunk center. Output is clamped to [0, 1] before scaling.
    pub detail_curve: Vec<CurveKey>,
    /// Chunks whose center direction has a cosine above this with the view
    /// direction are included in the physics mesh.
    pub physics_cutoff: f32,
}

/// Parameters for one layered (fractal) noise stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseLayerConfig {
    /// Number of octaves.
    pub layers: u32,
    /// Base frequency on the unit sphere.
    pub scale: f32,
    /// Output multiplier.
    pub elevation: f32,
    /// Added after scaling by `elevation`.
    pub vertical_shift: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub gain: f32,
    /// Sample-space offset.
    pub offset: [f32; 3],
}

/// Crater placement and shape parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CraterConfig {
    /// Number of craters scattered over the planet.
    pub count: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Maps a uniformly drawn radius in `[min_radius, max_radius]` to the final radius.
    pub size_curve: Vec<CurveKey>,
    pub rim_steepness: f32,
    pub rim_width: f32,
    pub floor_height: f32,
    pub smoothness: f32,
}

/// Global shape parameters handed to the height/color function.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Seed for noise permutation and crater placement.
    pub seed: u64,
    pub shape: NoiseLayerConfig,
    pub detail: NoiseLayerConfig,
    pub ridge: NoiseLayerConfig,
    pub ocean: NoiseLayerConfig,
    /// Depth of the ocean floor below the base sphere, as a fraction of the radius.
    pub ocean_floor: f32,
    /// Noise perturbing the color blend.
    pub color: NoiseLayerConfig,
    /// RGBA color at low elevation.
    pub color_low: [f32; 4],
    /// RGBA color at high elevation.
    pub color_high: [f32; 4],
    pub blend_width: f32,
    pub blend_height: f32,
    pub craters: CraterConfig,
}

/// Batch evaluator backend selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ComputeBackend {
    /// Data-parallel evaluation on the CPU thread pool.
    #[default]
    Cpu,
    /// wgpu compute shader dispatch.
    Gpu,
}

/// Compute backend configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComputeConfig {
    pub backend: ComputeBackend,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the config directory (debug builds only).
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            chunk_recursion_level: 4,
            max_detail_levels: 6,
            detail_curve: vec![
                CurveKey::new(-1.0, 0.0),
                CurveKey::new(0.6, 0.0),
                CurveKey::new(0.9, 0.4),
                CurveKey::new(0.98, 0.8),
                CurveKey::new(1.0, 1.0),
            ],
            physics_cutoff: 0.98,
        }
    }
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            layers: 3,
            scale: 1.0,
            elevation: 0.0,
            vertical_shift: 0.0,
            lacunarity: 2.0,
            gain: 0.5,
            offset: [0.0; 3],
        }
    }
}

impl Default for CraterConfig {
    fn default() -> Self {
        Self {
            count: 0,
            min_radius: 0.02,
            max_radius: 0.12,
            size_curve: vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)],
            rim_steepness: 0.4,
            rim_width: 0.7,
            floor_height: -0.3,
            smoothness: 0.5,
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shape: NoiseLayerConfig {
                layers: 4,
                scale: 1.2,
                elevation: 0.04,
                ..Default::default()
            },
            detail: NoiseLayerConfig {
                layers: 5,
                scale: 6.0,
                elevation: 0.006,
                ..Default::default()
            },
            ridge: NoiseLayerConfig {
                layers: 4,
                scale: 2.5,
                elevation: 0.03,
                ..Default::default()
            },
            ocean: NoiseLayerConfig {
                scale: 3.0,
                elevation: 0.002,
                ..Default::default()
            },
            ocean_floor: 0.015,
            color: NoiseLayerConfig {
                scale: 8.0,
                elevation: 0.004,
                ..Default::default()
            },
            color_low: [0.32, 0.36, 0.22, 1.0],
            color_high: [0.78, 0.76, 0.72, 1.0],
            blend_width: 5.0,
            blend_height: 0.0,
            craters: CraterConfig::default(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// The platform configuration directory for this application (`<config>/globe`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("globe"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Sanitizing ---

impl Config {
    /// Clamp out-of-range values into their valid ranges.
    ///
    /// Invalid settings are a policy matter, not an error: every adjustment
    /// is logged as a warning and the nearest valid value is used.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let mesh = &mut self.mesh;
        if mesh.chunk_recursion_level > MAX_RECURSION_LEVEL {
            log::warn!(
                "chunk_recursion_level {} exceeds {MAX_RECURSION_LEVEL}, clamping",
                mesh.chunk_recursion_level
            );
            mesh.chunk_recursion_level = MAX_RECURSION_LEVEL;
        }
        let levels = mesh.max_detail_levels.clamp(1, MAX_DETAIL_LEVELS);
        if levels != mesh.max_detail_levels {
            log::warn!(
                "max_detail_levels {} outside [1, {MAX_DETAIL_LEVELS}], using {levels}",
                mesh.max_detail_levels
            );
            mesh.max_detail_levels = levels;
        }
        if !mesh.physics_cutoff.is_finite() || !(0.0..=1.0).contains(&mesh.physics_cutoff) {
            let cutoff = if mesh.physics_cutoff.is_finite() {
                mesh.physics_cutoff.clamp(0.0, 1.0)
            } else {
                MeshConfig::default().physics_cutoff
            };
            log::warn!(
                "physics_cutoff {} outside [0, 1], using {cutoff}",
                mesh.physics_cutoff
            );
            mesh.physics_cutoff = cutoff;
        }
        drop_non_finite_keys("detail_curve", &mut mesh.detail_curve);

        let craters = &mut self.surface.craters;
        drop_non_finite_keys("size_curve", &mut craters.size_curve);
        if craters.min_radius > craters.max_radius {
            log::warn!(
                "crater min_radius {} > max_radius {}, swapping",
                craters.min_radius,
                craters.max_radius
            );
            std::mem::swap(&mut craters.min_radius, &mut craters.max_radius);
        }
        self
    }
}

fn drop_non_finite_keys(name: &str, keys: &mut Vec<CurveKey>) {
    let before = keys.len();
    keys.retain(|k| k.time.is_finite() && k.value.is_finite());
    if keys.len() != before {
        log::warn!("dropped {} non-finite keys from {name}", before - keys.len());
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
