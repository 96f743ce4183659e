//! Flat grid templates shared by every chunk at a detail level.
//!
//! A template for level `L` is a `2^L × 2^L` quad grid in `[0, 1]²` with
//! `(2^L + 1)²` vertices stored row-major from the top row down. Besides the
//! triangle list it records, for each [`Side`], the vertex indices lying on
//! that edge in clockwise traversal order: top left-to-right, right
//! top-to-bottom, bottom right-to-left, left bottom-to-top.

use std::sync::Arc;

use glam::Vec2;
use globe_cubesphere::Side;
use tracing::debug;

/// Highest level a template can be built for.
pub const MAX_TEMPLATE_LEVEL: u8 = 15;

/// Vertices in the level `level` grid.
fn grid_vertex_count(level: u8) -> usize {
    let side = (1usize << level) + 1;
    side * side
}

/// Triangle list length for the level `level` grid. Exceeds `u32` at the
/// top levels, so it is computed in `usize`.
fn grid_index_count(level: u8) -> usize {
    let dimension = 1usize << level;
    dimension * dimension * 6
}

/// Grid topology for one detail level.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneTemplate {
    level: u8,
    dimension: u32,
    uvs: Vec<Vec2>,
    indices: Arc<[u32]>,
    borders: [Vec<u32>; 4],
}

impl PlaneTemplate {
    /// Build the template for `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_TEMPLATE_LEVEL`].
    pub fn new(level: u8) -> Self {
        assert!(
            level <= MAX_TEMPLATE_LEVEL,
            "template level {level} exceeds {MAX_TEMPLATE_LEVEL}"
        );
        let dimension = 1u32 << level;
        let side = dimension + 1;
        let scale = dimension as f32;

        let mut uvs = Vec::with_capacity(grid_vertex_count(level));
        for row in 0..side {
            for col in 0..side {
                uvs.push(Vec2::new(col as f32 / scale, row as f32 / scale));
            }
        }

        let mut indices = Vec::with_capacity(grid_index_count(level));
        for row in 0..dimension {
            for col in 0..dimension {
                let i = row * side + col;
                indices.extend_from_slice(&[i, i + side + 1, i + side]);
                indices.extend_from_slice(&[i, i + 1, i + side + 1]);
            }
        }

        let last = dimension;
        let top = (0..side).collect();
        let right = (0..side).map(|row| row * side + last).collect();
        let bottom = (0..side).rev().map(|col| last * side + col).collect();
        let left = (0..side).rev().map(|row| row * side).collect();

        Self {
            level,
            dimension,
            uvs,
            indices: indices.into(),
            borders: [top, right, bottom, left],
        }
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Quads along one side (`2^level`).
    #[must_use]
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Vertices along one side (`2^level + 1`).
    #[must_use]
    pub fn vertices_per_side(&self) -> usize {
        self.dimension as usize + 1
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.uvs.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Template-local `(u, v)` per vertex; `(0, 0)` is the top-left corner.
    #[must_use]
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangle list shared by every chunk at this level.
    #[must_use]
    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    /// Vertex indices along `side`, in traversal order.
    #[must_use]
    pub fn border(&self, side: Side) -> &[u32] {
        &self.borders[side.index()]
    }
}

/// Templates for levels `0..levels`, built once and shared read-only.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneTemplateCache {
    templates: Vec<PlaneTemplate>,
}

impl PlaneTemplateCache {
    /// Build templates for levels `0..levels`.
    ///
    /// # Panics
    ///
    /// Panics if `levels` is zero or a level exceeds [`MAX_TEMPLATE_LEVEL`].
    pub fn new(levels: u8) -> Self {
        assert!(levels > 0, "template cache needs at least one level");
        let templates: Vec<PlaneTemplate> = (0..levels).map(PlaneTemplate::new).collect();
        debug!(
            levels,
            largest_vertex_count = templates.last().map_or(0, PlaneTemplate::vertex_count),
            "Built plane template cache"
        );
        Self { templates }
    }

    /// Number of cached levels.
    #[must_use]
    pub fn levels(&self) -> u8 {
        self.templates.len() as u8
    }

    #[must_use]
    pub fn get(&self, level: u8) -> Option<&PlaneTemplate> {
        self.templates.get(usize::from(level))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaneTemplate> {
        self.templates.iter()
    }
}
