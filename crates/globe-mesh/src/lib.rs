//! Terrain mesh data: shared plane templates, per-chunk mesh buffers, LOD
//! border stitching, and combined render/physics meshes.

mod chunk_mesh;
mod combine;
mod lod_stitching;
mod template;
mod vertex_format;

pub use chunk_mesh::ChunkMesh;
pub use combine::CombinedMesh;
pub use lod_stitching::{stitch_chunk_border, stitch_edge};
pub use template::{MAX_TEMPLATE_LEVEL, PlaneTemplate, PlaneTemplateCache};
pub use vertex_format::{TERRAIN_VERTEX_ATTRIBUTES, TERRAIN_VERTEX_LAYOUT, TerrainVertex};
