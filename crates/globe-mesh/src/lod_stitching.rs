//! LOD border stitching: eliminates cracks at edges shared by chunks at
//! different levels of detail.
//!
//! The coarser border is authoritative. Every vertex of the finer border
//! that coincides with a coarse vertex is copied from it; the vertices in
//! between are placed on the straight segment joining their two coarse
//! neighbors, which removes the T-junction.

use glam::Vec3;
use globe_cubesphere::Side;

use crate::{ChunkMesh, PlaneTemplate};

/// Rewrite `higher` so it follows the polyline `lower`.
///
/// Both slices run in the same direction along the shared edge. With
/// `ratio = (higher.len() - 1) / (lower.len() - 1)`, vertex `i` is copied
/// from `lower[i / ratio]` when `i` is a multiple of `ratio`, and otherwise
/// interpolated between `lower[i / ratio]` and `lower[i / ratio + 1]` with
/// fraction `(i % ratio) / ratio`. Equal lengths copy every vertex.
///
/// # Panics
///
/// Panics if `lower` has fewer than two vertices, if `higher` is shorter
/// than `lower`, or if the segment counts are not an integer multiple.
pub fn stitch_edge(higher: &mut [Vec3], lower: &[Vec3]) {
    assert!(lower.len() >= 2, "border needs at least two vertices");
    assert!(
        higher.len() >= lower.len(),
        "higher border ({}) is coarser than lower border ({})",
        higher.len(),
        lower.len()
    );
    let lower_segments = lower.len() - 1;
    let higher_segments = higher.len() - 1;
    assert!(
        higher_segments % lower_segments == 0,
        "border segment counts {higher_segments} and {lower_segments} are not compatible"
    );

    let ratio = higher_segments / lower_segments;
    for (i, vertex) in higher.iter_mut().enumerate() {
        let base = i / ratio;
        let rem = i % ratio;
        *vertex = if rem == 0 {
            lower[base]
        } else {
            lower[base].lerp(lower[base + 1], rem as f32 / ratio as f32)
        };
    }
}

/// Make `target`'s border on `target_side` follow `source`'s border on
/// `source_side`.
///
/// The two chunks traverse their shared edge in opposite directions, so the
/// source border is reversed before stitching. `source` must have no more
/// border vertices than `target`.
///
/// # Panics
///
/// Panics if a mesh does not match its template or the border vertex counts
/// are incompatible (see [`stitch_edge`]).
pub fn stitch_chunk_border(
    target: &mut ChunkMesh,
    target_template: &PlaneTemplate,
    target_side: Side,
    source: &ChunkMesh,
    source_template: &PlaneTemplate,
    source_side: Side,
) {
    assert_eq!(target.vertex_count(), target_template.vertex_count());
    assert_eq!(source.vertex_count(), source_template.vertex_count());

    let lower: Vec<Vec3> = source_template
        .border(source_side)
        .iter()
        .rev()
        .map(|&i| source.positions[i as usize])
        .collect();

    let target_border = target_template.border(target_side);
    let mut higher: Vec<Vec3> = target_border
        .iter()
        .map(|&i| target.positions[i as usize])
        .collect();

    stitch_edge(&mut higher, &lower);

    for (&i, position) in target_border.iter().zip(higher) {
        target.positions[i as usize] = position;
    }
}
