//! Per-chunk mesh buffers filled from batch evaluation output.

use std::sync::Arc;

use glam::{Vec3, Vec4};

use crate::PlaneTemplate;

/// Vertex positions and colors of one chunk, plus the triangle list shared
/// with every other chunk at the same level.
///
/// The buffers are reused across rebuilds; their length always equals the
/// vertex count of the template last applied.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    indices: Arc<[u32]>,
}

impl ChunkMesh {
    /// Overwrite the mesh with one chunk's slice of evaluator output.
    ///
    /// # Panics
    ///
    /// Panics if either slice does not match the template's vertex count.
    pub fn update(&mut self, template: &PlaneTemplate, positions: &[Vec3], colors: &[Vec4]) {
        assert_eq!(positions.len(), template.vertex_count(), "position count");
        assert_eq!(colors.len(), template.vertex_count(), "color count");

        self.positions.clear();
        self.positions.extend_from_slice(positions);
        self.colors.clear();
        self.colors.extend_from_slice(colors);
        if !Arc::ptr_eq(&self.indices, template.indices()) {
            self.indices = Arc::clone(template.indices());
        }
    }

    /// Drop all vertex data.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.indices = Arc::default();
    }

    #[must_use]
    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
