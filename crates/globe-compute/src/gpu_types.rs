//! Host-side mirrors of the compute kernel's buffer layouts.
//!
//! Every struct here matches a WGSL struct in `terrain_kernel.wgsl` field
//! for field, including explicit padding to the 16-byte alignment that
//! uniform arrays and `vec3`/`vec4` members require.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use globe_config::{NoiseLayerConfig, SurfaceConfig};
use globe_cubesphere::ChunkBounds;
use globe_terrain::Crater;
use static_assertions::const_assert_eq;

/// One chunk's corners as four `vec4<f32>` (w unused).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuChunkBounds {
    pub top_left: [f32; 4],
    pub top_right: [f32; 4],
    pub bottom_left: [f32; 4],
    pub bottom_right: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<GpuChunkBounds>(), 64);

impl From<&ChunkBounds> for GpuChunkBounds {
    fn from(bounds: &ChunkBounds) -> Self {
        let pad = |v: Vec3| v.extend(0.0).to_array();
        Self {
            top_left: pad(bounds.top_left),
            top_right: pad(bounds.top_right),
            bottom_left: pad(bounds.bottom_left),
            bottom_right: pad(bounds.bottom_right),
        }
    }
}

/// Per-dispatch sizes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DispatchParams {
    /// Template vertices per chunk.
    pub template_count: u32,
    pub chunk_count: u32,
    /// `template_count * chunk_count`; invocations at or past this exit.
    pub total: u32,
    /// Invocations per grid row when the dispatch is folded into 2D.
    pub row_width: u32,
}

const_assert_eq!(std::mem::size_of::<DispatchParams>(), 16);

/// One layered noise stack.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuNoiseLayer {
    pub offset: [f32; 3],
    pub layers: u32,
    pub scale: f32,
    pub elevation: f32,
    pub vertical_shift: f32,
    pub lacunarity: f32,
    pub gain: f32,
    pub _pad: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<GpuNoiseLayer>(), 48);

impl From<&NoiseLayerConfig> for GpuNoiseLayer {
    fn from(layer: &NoiseLayerConfig) -> Self {
        Self {
            offset: layer.offset,
            layers: layer.layers,
            scale: layer.scale,
            elevation: layer.elevation,
            vertical_shift: layer.vertical_shift,
            lacunarity: layer.lacunarity,
            gain: layer.gain,
            _pad: [0.0; 3],
        }
    }
}

impl GpuNoiseLayer {
    /// The five stacks in kernel binding order: shape, detail, ridge, ocean, color.
    pub fn stack(config: &SurfaceConfig) -> [GpuNoiseLayer; 5] {
        [
            &config.shape,
            &config.detail,
            &config.ridge,
            &config.ocean,
            &config.color,
        ]
        .map(GpuNoiseLayer::from)
    }
}

/// Scalar surface parameters.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceUniform {
    pub color_low: [f32; 4],
    pub color_high: [f32; 4],
    pub ocean_floor: f32,
    pub blend_width: f32,
    pub blend_height: f32,
    pub crater_count: u32,
    pub rim_steepness: f32,
    pub rim_width: f32,
    pub floor_height: f32,
    pub smoothness: f32,
    /// Sample-space shift derived from the seed; `w` unused.
    pub seed_offset: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<SurfaceUniform>(), 80);

impl SurfaceUniform {
    pub fn new(config: &SurfaceConfig, crater_count: u32) -> Self {
        let craters = &config.craters;
        Self {
            color_low: config.color_low,
            color_high: config.color_high,
            ocean_floor: config.ocean_floor,
            blend_width: config.blend_width,
            blend_height: config.blend_height,
            crater_count,
            rim_steepness: craters.rim_steepness,
            rim_width: craters.rim_width,
            floor_height: craters.floor_height,
            smoothness: craters.smoothness,
            seed_offset: seed_offset(config.seed),
        }
    }
}

/// Spread a seed into a sample-space offset with splitmix64 steps. Components
/// stay within ±512 so f32 noise coordinates keep their precision.
fn seed_offset(seed: u64) -> [f32; 4] {
    let mut state = seed;
    let mut next = || {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        ((z >> 40) as f32 / (1u64 << 24) as f32 - 0.5) * 1024.0
    };
    [next(), next(), next(), 0.0]
}

/// Craters packed as `vec4(center, radius)`.
///
/// Storage buffers cannot be empty, so an empty list becomes one
/// zero-radius placeholder that the kernel skips.
pub fn crater_data(craters: &[Crater]) -> Vec<[f32; 4]> {
    if craters.is_empty() {
        return vec![[0.0; 4]];
    }
    craters
        .iter()
        .map(|c| c.center.extend(c.radius).to_array())
        .collect()
}

/// Workgroup grid for `invocations` threads of `workgroup_size`, folded into
/// a second dimension when one row would exceed `max_per_dimension`.
///
/// Returns `(x, y, row_width)` with `row_width = x * workgroup_size`.
pub fn dispatch_grid(invocations: u32, workgroup_size: u32, max_per_dimension: u32) -> (u32, u32, u32) {
    let groups = invocations.div_ceil(workgroup_size).max(1);
    let max = max_per_dimension.max(1);
    let (x, y) = if groups <= max {
        (groups, 1)
    } else {
        (max, groups.div_ceil(max))
    };
    (x, y, x * workgroup_size)
}
