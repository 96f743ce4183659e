//! Concatenation of chunk meshes into one render or physics mesh.

use glam::{Vec3, Vec4};

use crate::{ChunkMesh, TerrainVertex};

/// A single mesh built from many chunk meshes.
///
/// Chunk vertices are appended in order and each chunk's indices are offset
/// by the number of vertices before it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombinedMesh {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl CombinedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine `meshes` and compute smooth normals.
    pub fn combine<'a, I>(meshes: I) -> Self
    where
        I: IntoIterator<Item = &'a ChunkMesh>,
    {
        let mut combined = Self::new();
        combined.rebuild(meshes);
        combined
    }

    /// Replace the contents with `meshes`, reusing allocations.
    pub fn rebuild<'a, I>(&mut self, meshes: I)
    where
        I: IntoIterator<Item = &'a ChunkMesh>,
    {
        self.clear();
        for mesh in meshes {
            self.append(mesh);
        }
        self.recalculate_normals();
    }

    /// Append one chunk. Normals are not updated.
    ///
    /// # Panics
    ///
    /// Panics if the combined vertex count no longer fits a `u32` index.
    pub fn append(&mut self, mesh: &ChunkMesh) {
        let base = self.positions.len();
        assert!(
            u32::try_from(base + mesh.vertex_count()).is_ok(),
            "combined mesh exceeds u32 index range"
        );
        let offset = base as u32;

        self.positions.extend_from_slice(&mesh.positions);
        self.colors.extend_from_slice(&mesh.colors);
        self.indices
            .extend(mesh.indices().iter().map(|&i| i + offset));
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.normals.clear();
        self.indices.clear();
    }

    /// Area-weighted vertex normals from the triangle list.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.positions.len(), Vec3::ZERO);

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let pa = self.positions[a];
            let face = (self.positions[b] - pa).cross(self.positions[c] - pa);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Interleave into GPU-ready vertices matching
    /// [`crate::TERRAIN_VERTEX_LAYOUT`].
    #[must_use]
    pub fn vertices(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.colors)
            .enumerate()
            .map(|(i, (&position, &color))| {
                let normal = self.normals.get(i).copied().unwrap_or(Vec3::ZERO);
                TerrainVertex::new(position, normal, color)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaneTemplate;

    /// A flat chunk in the plane z = `z`, facing +z.
    fn flat_chunk(template: &PlaneTemplate, z: f32) -> ChunkMesh {
        let positions: Vec<Vec3> = template
            .uvs()
            .iter()
            .map(|uv| Vec3::new(uv.x, uv.y, z))
            .collect();
        let colors = vec![Vec4::new(0.5, 0.5, 0.5, 1.0); positions.len()];
        let mut mesh = ChunkMesh::default();
        mesh.update(template, &positions, &colors);
        mesh
    }

    #[test]
    fn test_combine_offsets_indices() {
        let t = PlaneTemplate::new(1);
        let a = flat_chunk(&t, 0.0);
        let b = flat_chunk(&t, 1.0);
        let combined = CombinedMesh::combine([&a, &b]);

        assert_eq!(combined.vertex_count(), 18);
        assert_eq!(combined.triangle_count(), 16);
        assert_eq!(&combined.indices[..24], &t.indices()[..]);
        for (k, &i) in combined.indices[24..].iter().enumerate() {
            assert_eq!(i, t.indices()[k] + 9);
        }
        assert_eq!(combined.positions[9], b.positions[0]);
    }

    #[test]
    fn test_flat_normals_point_out_of_plane() {
        let t = PlaneTemplate::new(2);
        let combined = CombinedMesh::combine([&flat_chunk(&t, 0.0)]);
        assert_eq!(combined.normals.len(), combined.vertex_count());
        for n in &combined.normals {
            assert!((*n - Vec3::Z).length() < 1e-6, "{n:?}");
        }
    }

    #[test]
    fn test_empty_combine() {
        let combined = CombinedMesh::combine(std::iter::empty());
        assert!(combined.is_empty());
        assert!(combined.vertices().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let t = PlaneTemplate::new(1);
        let a = flat_chunk(&t, 0.0);
        let mut combined = CombinedMesh::combine([&a, &a, &a]);
        combined.rebuild([&a]);
        assert_eq!(combined.vertex_count(), 9);
        assert_eq!(combined.normals.len(), 9);
    }

    #[test]
    fn test_vertices_interleave_attributes() {
        let t = PlaneTemplate::new(0);
        let combined = CombinedMesh::combine([&flat_chunk(&t, 2.0)]);
        let vertices = combined.vertices();
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[3].position, [1.0, 1.0, 2.0]);
        assert_eq!(vertices[3].color, [0.5, 0.5, 0.5, 1.0]);
        assert!((Vec3::from_array(vertices[3].normal) - Vec3::Z).length() < 1e-6);
    }
}
