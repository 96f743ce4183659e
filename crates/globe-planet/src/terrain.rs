//! The chunked terrain aggregator.

use std::sync::Arc;

use glam::Vec3;
use globe_compute::{BatchEvaluator, DispatchError, SurfaceBinding};
use globe_config::{CurveKey, MAX_RECURSION_LEVEL, MeshConfig, SurfaceConfig};
use globe_cubesphere::ChunkBounds;
use globe_lod::{LodBuckets, LodSelector, ResponseCurve};
use globe_mesh::{CombinedMesh, PlaneTemplateCache};
use tracing::{debug, info, warn};

use crate::{Chunk, TerrainError, build_chunks, stitch_borders};

/// What one [`ChunkedTerrain::update`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// False when no chunk changed level and no rebuild was forced.
    pub rebuilt: bool,
    pub chunks_updated: usize,
    /// One per non-empty level bucket.
    pub dispatches: usize,
    pub borders_stitched: usize,
    pub render_vertices: usize,
}

/// Owns the chunk array and runs select, dispatch, stitch, and combine
/// every frame.
pub struct ChunkedTerrain<E> {
    evaluator: E,
    templates: Arc<PlaneTemplateCache>,
    chunks: Vec<Chunk>,
    depth: u32,
    selector: LodSelector,
    buckets: LodBuckets,
    physics_cutoff: f32,
    render_mesh: CombinedMesh,
    physics_mesh: CombinedMesh,
    /// Forces the next update to rebuild every chunk.
    rebuild_pending: bool,
}

impl<E: BatchEvaluator> ChunkedTerrain<E> {
    /// Build the chunk array for `config.chunk_recursion_level`.
    ///
    /// Detail levels come from the evaluator's template cache, so the
    /// selector never picks a level without a template.
    pub fn new(evaluator: E, config: &MeshConfig) -> Self {
        let templates = Arc::clone(evaluator.templates());
        let levels = templates.levels();
        if levels != config.max_detail_levels {
            warn!(
                configured = config.max_detail_levels,
                available = levels,
                "Detail levels follow the template cache"
            );
        }

        let depth = clamp_depth(config.chunk_recursion_level);
        let chunks = build_chunks(depth);
        info!(depth, chunks = chunks.len(), levels, "Generated chunk topology");

        Self {
            evaluator,
            templates,
            chunks,
            depth,
            selector: LodSelector::new(ResponseCurve::new(&config.detail_curve), levels),
            buckets: LodBuckets::new(levels),
            physics_cutoff: clamp_cutoff(config.physics_cutoff)
                .unwrap_or(MeshConfig::default().physics_cutoff),
            render_mesh: CombinedMesh::new(),
            physics_mesh: CombinedMesh::new(),
            rebuild_pending: false,
        }
    }

    /// Run one frame of the pipeline for a viewer at `view`.
    ///
    /// Does nothing when no chunk wants a different level and neither
    /// `force` nor a pending reconfiguration requests a rebuild. A dispatch
    /// failure abandons the frame and schedules a full rebuild, since
    /// buckets dispatched before the failure left unstitched meshes behind.
    pub fn update(&mut self, view: Vec3, force: bool) -> Result<FrameStats, TerrainError> {
        let force = force || std::mem::take(&mut self.rebuild_pending);
        self.buckets.rebuild(
            &self.selector,
            self.chunks.iter().map(|c| (c.center, c.current_lod)),
            view,
            force,
        );
        if self.buckets.is_empty() {
            return Ok(FrameStats::default());
        }

        let result = self.rebuild_frame(view);
        if result.is_err() {
            self.rebuild_pending = true;
        }
        result
    }

    fn rebuild_frame(&mut self, view: Vec3) -> Result<FrameStats, TerrainError> {
        let mut stats = FrameStats {
            rebuilt: true,
            ..Default::default()
        };

        let mut bounds: Vec<ChunkBounds> = Vec::new();
        for (level, bucket) in self.buckets.iter_descending() {
            let template = self
                .templates
                .get(level)
                .ok_or(DispatchError::TemplateMissing { level })?;
            bounds.clear();
            bounds.extend(bucket.iter().map(|&i| self.chunks[i].bounds));

            let output = self.evaluator.evaluate(level, &bounds)?;
            let expected = bucket.len() * template.vertex_count();
            if output.positions.len() != expected
                || output.vertices_per_chunk() != template.vertex_count()
            {
                return Err(DispatchError::OutputMismatch {
                    expected,
                    actual: output.positions.len(),
                }
                .into());
            }

            for (j, &index) in bucket.iter().enumerate() {
                let (positions, colors) = output.chunk(j);
                self.chunks[index].apply(template, positions, colors);
            }
            debug!(level, chunks = bucket.len(), "Bucket rebuilt");
            stats.chunks_updated += bucket.len();
            stats.dispatches += 1;
        }

        stats.borders_stitched = stitch_borders(&mut self.chunks, &self.templates);
        self.render_mesh.rebuild(self.chunks.iter().map(|c| &c.mesh));
        self.rebuild_physics(view);
        for chunk in &mut self.chunks {
            chunk.mesh_update_pending = false;
        }

        stats.render_vertices = self.render_mesh.vertex_count();
        debug!(
            updated = stats.chunks_updated,
            dispatches = stats.dispatches,
            stitched = stats.borders_stitched,
            vertices = stats.render_vertices,
            "Terrain frame rebuilt"
        );
        Ok(stats)
    }
}

impl<E> ChunkedTerrain<E> {
    /// The combined mesh of every chunk, refreshed on rebuild frames.
    pub fn render_mesh(&self) -> &CombinedMesh {
        &self.render_mesh
    }

    /// Combine the chunks whose center direction is within the physics
    /// cutoff of `view`. Recombined on every call.
    pub fn physics_mesh(&mut self, view: Vec3) -> &CombinedMesh {
        self.rebuild_physics(view);
        &self.physics_mesh
    }

    /// The physics mesh as of the last rebuild frame or
    /// [`ChunkedTerrain::physics_mesh`] call.
    pub fn last_physics_mesh(&self) -> &CombinedMesh {
        &self.physics_mesh
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn templates(&self) -> &Arc<PlaneTemplateCache> {
        &self.templates
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }

    pub fn recursion_depth(&self) -> u32 {
        self.depth
    }

    pub fn physics_cutoff(&self) -> f32 {
        self.physics_cutoff
    }

    /// Regenerate the chunk array when `depth` differs from the current
    /// depth, discarding all meshes. Returns whether it regenerated.
    pub fn set_recursion_depth(&mut self, depth: u32) -> bool {
        let depth = clamp_depth(depth);
        if depth == self.depth {
            return false;
        }
        self.chunks = build_chunks(depth);
        self.depth = depth;
        self.render_mesh.clear();
        self.physics_mesh.clear();
        self.rebuild_pending = true;
        info!(depth, chunks = self.chunks.len(), "Regenerated chunk topology");
        true
    }

    /// Replace the detail response curve. Takes effect on the next update.
    pub fn set_detail_curve(&mut self, keys: &[CurveKey]) {
        self.selector.set_curve(ResponseCurve::new(keys));
    }

    /// Set the physics view-alignment cutoff, clamped to `[0, 1]`. A
    /// non-finite cutoff is ignored.
    pub fn set_physics_cutoff(&mut self, cutoff: f32) {
        match clamp_cutoff(cutoff) {
            Some(cutoff) => self.physics_cutoff = cutoff,
            None => warn!(cutoff, current = self.physics_cutoff, "Ignoring non-finite physics cutoff"),
        }
    }

    /// Apply the depth, curve, and cutoff of `config`.
    ///
    /// The number of detail levels is fixed by the template cache; a change
    /// there needs a new evaluator and a new terrain.
    pub fn reconfigure(&mut self, config: &MeshConfig) {
        if config.max_detail_levels != self.templates.levels() {
            warn!(
                requested = config.max_detail_levels,
                current = self.templates.levels(),
                "Detail level count ignored until the terrain is rebuilt"
            );
        }
        self.set_recursion_depth(config.chunk_recursion_level);
        self.set_detail_curve(&config.detail_curve);
        self.set_physics_cutoff(config.physics_cutoff);
    }

    fn rebuild_physics(&mut self, view: Vec3) {
        let view = view.normalize_or_zero();
        let cutoff = self.physics_cutoff;
        self.physics_mesh.rebuild(
            self.chunks
                .iter()
                .filter(|c| view.dot(c.center.normalize_or_zero()) > cutoff)
                .map(|c| &c.mesh),
        );
    }
}

impl<E: SurfaceBinding> ChunkedTerrain<E> {
    /// Swap the evaluator's surface parameters and rebuild every chunk on
    /// the next update.
    pub fn rebind_surface(&mut self, config: &SurfaceConfig) {
        self.evaluator.bind_surface(config);
        self.rebuild_pending = true;
        debug!(seed = config.seed, "Surface rebound");
    }
}

fn clamp_cutoff(cutoff: f32) -> Option<f32> {
    cutoff.is_finite().then(|| cutoff.clamp(0.0, 1.0))
}

fn clamp_depth(depth: u32) -> u32 {
    if depth > MAX_RECURSION_LEVEL {
        warn!(depth, max = MAX_RECURSION_LEVEL, "Recursion depth clamped");
        return MAX_RECURSION_LEVEL;
    }
    depth
}
