//! The backend-independent batch evaluation contract.

use std::sync::Arc;

use glam::{Vec3, Vec4};
use globe_config::SurfaceConfig;
use globe_cubesphere::ChunkBounds;
use globe_mesh::PlaneTemplateCache;

use crate::DispatchError;

/// Result of one bucket dispatch, laid out chunk-major: vertex `i` of chunk
/// `j` is at `j * vertices_per_chunk + i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutput {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    vertices_per_chunk: usize,
}

impl BatchOutput {
    /// Wrap chunk-major buffers.
    ///
    /// Fails with [`DispatchError::OutputMismatch`] when the two buffers
    /// differ in length or are not a whole number of chunks.
    pub fn new(
        positions: Vec<Vec3>,
        colors: Vec<Vec4>,
        vertices_per_chunk: usize,
    ) -> Result<Self, DispatchError> {
        if positions.len() != colors.len() {
            return Err(DispatchError::OutputMismatch {
                expected: positions.len(),
                actual: colors.len(),
            });
        }
        if vertices_per_chunk == 0 || positions.len() % vertices_per_chunk != 0 {
            let whole = positions.len().next_multiple_of(vertices_per_chunk.max(1));
            return Err(DispatchError::OutputMismatch {
                expected: whole,
                actual: positions.len(),
            });
        }
        Ok(Self {
            positions,
            colors,
            vertices_per_chunk,
        })
    }

    pub fn vertices_per_chunk(&self) -> usize {
        self.vertices_per_chunk
    }

    pub fn chunk_count(&self) -> usize {
        self.positions.len().checked_div(self.vertices_per_chunk).unwrap_or(0)
    }

    /// Positions and colors of the `index`-th chunk of the bucket.
    ///
    /// # Panics
    ///
    /// Panics if `index >= chunk_count()`.
    pub fn chunk(&self, index: usize) -> (&[Vec3], &[Vec4]) {
        let range = index * self.vertices_per_chunk..(index + 1) * self.vertices_per_chunk;
        (&self.positions[range.clone()], &self.colors[range])
    }
}

/// Evaluates every plane-template vertex of a bucket of chunks at one level.
pub trait BatchEvaluator {
    /// The template cache the evaluator was built against. The aggregator
    /// shares the same cache for mesh indices and border lists.
    fn templates(&self) -> &Arc<PlaneTemplateCache>;

    /// Evaluate all `bounds` at `level` in one dispatch, preserving order.
    /// Blocks until results are available.
    fn evaluate(&self, level: u8, bounds: &[ChunkBounds]) -> Result<BatchOutput, DispatchError>;
}

/// Evaluators whose height/color parameters can be swapped at runtime.
pub trait SurfaceBinding {
    fn bind_surface(&mut self, config: &SurfaceConfig);
}
