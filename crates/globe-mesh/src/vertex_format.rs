//! GPU vertex format for combined terrain meshes.
//!
//! Hosts rendering a [`crate::CombinedMesh`] upload [`TerrainVertex`] data and
//! reference [`TERRAIN_VERTEX_LAYOUT`] in their pipelines.
//!
//! ## Attribute Packing
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x4 | color    |

use std::mem;

use glam::{Vec3, Vec4};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One interleaved terrain vertex (40 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 40]);

impl TerrainVertex {
    pub fn new(position: Vec3, normal: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
        }
    }
}

pub const TERRAIN_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 24,
        shader_location: 2,
    },
];

/// Vertex buffer layout for [`TerrainVertex`] data.
pub const TERRAIN_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TerrainVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TERRAIN_VERTEX_ATTRIBUTES,
};

const _: () =
    assert!(TERRAIN_VERTEX_ATTRIBUTES[1].offset == mem::offset_of!(TerrainVertex, normal) as u64);
const _: () =
    assert!(TERRAIN_VERTEX_ATTRIBUTES[2].offset == mem::offset_of!(TerrainVertex, color) as u64);
