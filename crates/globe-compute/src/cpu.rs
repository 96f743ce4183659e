//! Data-parallel CPU backend.

use std::sync::Arc;

use glam::{Vec3, Vec4};
use globe_config::SurfaceConfig;
use globe_cubesphere::ChunkBounds;
use globe_mesh::PlaneTemplateCache;
use globe_terrain::{LayeredNoiseSurface, SurfaceSampler};
use rayon::prelude::*;
use tracing::trace;

use crate::{BatchEvaluator, BatchOutput, DispatchError, SurfaceBinding};

/// Evaluates a bucket on the rayon thread pool, one task per chunk.
pub struct CpuEvaluator<S> {
    templates: Arc<PlaneTemplateCache>,
    surface: S,
}

impl<S: SurfaceSampler> CpuEvaluator<S> {
    pub fn new(templates: Arc<PlaneTemplateCache>, surface: S) -> Self {
        Self { templates, surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl CpuEvaluator<LayeredNoiseSurface> {
    /// CPU evaluator over the layered noise surface described by `config`.
    pub fn from_config(templates: Arc<PlaneTemplateCache>, config: &SurfaceConfig) -> Self {
        Self::new(templates, LayeredNoiseSurface::new(config))
    }
}

impl<S: SurfaceSampler> BatchEvaluator for CpuEvaluator<S> {
    fn templates(&self) -> &Arc<PlaneTemplateCache> {
        &self.templates
    }

    fn evaluate(&self, level: u8, bounds: &[ChunkBounds]) -> Result<BatchOutput, DispatchError> {
        let template = self
            .templates
            .get(level)
            .ok_or(DispatchError::TemplateMissing { level })?;
        let per_chunk = template.vertex_count();
        let total = per_chunk * bounds.len();

        let mut positions = vec![Vec3::ZERO; total];
        let mut colors = vec![Vec4::ZERO; total];
        positions
            .par_chunks_mut(per_chunk)
            .zip(colors.par_chunks_mut(per_chunk))
            .zip(bounds.par_iter())
            .for_each(|((positions, colors), bounds)| {
                for ((position, color), uv) in
                    positions.iter_mut().zip(colors.iter_mut()).zip(template.uvs())
                {
                    (*position, *color) = self.surface.displace(bounds.direction(uv.x, uv.y));
                }
            });

        trace!(level, chunks = bounds.len(), vertices = total, "CPU bucket evaluated");
        BatchOutput::new(positions, colors, per_chunk)
    }
}

impl SurfaceBinding for CpuEvaluator<LayeredNoiseSurface> {
    fn bind_surface(&mut self, config: &SurfaceConfig) {
        self.surface = LayeredNoiseSurface::new(config);
    }
}
