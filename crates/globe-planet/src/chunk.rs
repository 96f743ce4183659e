//! One quadtree leaf of the planet surface and its mesh state.

use glam::{Vec3, Vec4};
use globe_cubesphere::{ChunkBorder, ChunkBounds, ChunkNode, Side, generate_chunks};
use globe_mesh::{ChunkMesh, PlaneTemplate};

/// A chunk in the flat, index-addressed chunk array.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub bounds: ChunkBounds,
    /// Mean of the four corners, used for view-angle tests. Not on the sphere.
    pub center: Vec3,
    /// Level of the template the mesh was last built from. `None` until the
    /// first evaluation.
    pub current_lod: Option<u8>,
    /// Neighbor links indexed by [`Side::index`].
    pub borders: [ChunkBorder; 4],
    pub mesh: ChunkMesh,
    /// Set when the mesh was rebuilt this frame and cleared after stitching.
    pub mesh_update_pending: bool,
}

impl From<ChunkNode> for Chunk {
    fn from(node: ChunkNode) -> Self {
        Self {
            bounds: node.bounds,
            center: node.center(),
            current_lod: None,
            borders: node.borders,
            mesh: ChunkMesh::default(),
            mesh_update_pending: false,
        }
    }
}

impl Chunk {
    pub fn border(&self, side: Side) -> ChunkBorder {
        self.borders[side.index()]
    }

    /// Whether the chunk has been evaluated at least once.
    pub fn has_mesh(&self) -> bool {
        self.current_lod.is_some() && !self.mesh.is_empty()
    }

    /// Install freshly evaluated vertices for `template`'s level.
    pub(crate) fn apply(&mut self, template: &PlaneTemplate, positions: &[Vec3], colors: &[Vec4]) {
        self.mesh.update(template, positions, colors);
        self.current_lod = Some(template.level());
        self.mesh_update_pending = true;
    }
}

/// The chunk array for recursion depth `depth`, with no meshes yet.
pub fn build_chunks(depth: u32) -> Vec<Chunk> {
    generate_chunks(depth).into_iter().map(Chunk::from).collect()
}
