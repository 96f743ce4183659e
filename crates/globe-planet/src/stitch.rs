//! Crack removal between adjacent chunks after a rebuild.
//!
//! Every shared edge is considered once per frame. The coarser chunk's
//! border is authoritative and the finer one is rewritten to follow it.
//! Between chunks at the same level, a chunk rebuilt this frame is
//! authoritative over one that was not: the settled chunk's border may still
//! hold an interpolated edge from an earlier, coarser neighbor. Two chunks
//! rebuilt together at the same level evaluated their shared edge
//! identically, so neither is touched.

use globe_cubesphere::Side;
use globe_mesh::{PlaneTemplateCache, stitch_chunk_border};
use tracing::trace;

use crate::Chunk;

/// Which chunk of an adjacent pair keeps its border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderAuthority {
    First,
    Second,
}

/// Decide whether a shared edge needs stitching and which side leads.
///
/// Each argument is a chunk's `(level, mesh_update_pending)`. Returns `None`
/// when neither chunk changed, or both changed at the same level.
pub fn border_authority(first: (u8, bool), second: (u8, bool)) -> Option<BorderAuthority> {
    let ((first_level, first_pending), (second_level, second_pending)) = (first, second);
    if !first_pending && !second_pending {
        return None;
    }
    match first_level.cmp(&second_level) {
        std::cmp::Ordering::Less => Some(BorderAuthority::First),
        std::cmp::Ordering::Greater => Some(BorderAuthority::Second),
        std::cmp::Ordering::Equal => match (first_pending, second_pending) {
            (true, false) => Some(BorderAuthority::First),
            (false, true) => Some(BorderAuthority::Second),
            _ => None,
        },
    }
}

/// Stitch every shared edge that needs it. Returns the number of borders
/// rewritten.
///
/// Chunks without a mesh are skipped. Pending flags are left untouched so
/// the caller can clear them once the frame is complete.
pub fn stitch_borders(chunks: &mut [Chunk], templates: &PlaneTemplateCache) -> usize {
    let mut stitched = 0;
    for index in 0..chunks.len() {
        for side in Side::ALL {
            let border = chunks[index].border(side);
            let neighbor = border.neighbor;
            if neighbor <= index {
                continue;
            }
            let (chunk, other) = (&chunks[index], &chunks[neighbor]);
            let (Some(level), Some(other_level)) = (chunk.current_lod, other.current_lod) else {
                continue;
            };
            if chunk.mesh.is_empty() || other.mesh.is_empty() {
                continue;
            }

            let authority = border_authority(
                (level, chunk.mesh_update_pending),
                (other_level, other.mesh_update_pending),
            );
            let (target, target_side, source, source_side) = match authority {
                None => continue,
                Some(BorderAuthority::First) => (neighbor, border.neighbor_side, index, side),
                Some(BorderAuthority::Second) => (index, side, neighbor, border.neighbor_side),
            };

            let (Some(target_template), Some(source_template)) = (
                chunks[target].current_lod.and_then(|l| templates.get(l)),
                chunks[source].current_lod.and_then(|l| templates.get(l)),
            ) else {
                continue;
            };

            let (target_chunk, source_chunk) = pair_mut(chunks, target, source);
            stitch_chunk_border(
                &mut target_chunk.mesh,
                target_template,
                target_side,
                &source_chunk.mesh,
                source_template,
                source_side,
            );
            trace!(target, ?target_side, source, ?source_side, "Stitched border");
            stitched += 1;
        }
    }
    stitched
}

/// Mutable access to `target` alongside shared access to `source`.
fn pair_mut(chunks: &mut [Chunk], target: usize, source: usize) -> (&mut Chunk, &Chunk) {
    debug_assert_ne!(target, source);
    if target < source {
        let (head, tail) = chunks.split_at_mut(source);
        (&mut head[target], &tail[0])
    } else {
        let (head, tail) = chunks.split_at_mut(target);
        (&mut tail[0], &head[source])
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::build_chunks;

    #[test]
    fn test_authority_table() {
        use BorderAuthority::{First, Second};
        assert_eq!(border_authority((1, false), (3, false)), None);
        assert_eq!(border_authority((1, true), (3, false)), Some(First));
        assert_eq!(border_authority((1, false), (3, true)), Some(First));
        assert_eq!(border_authority((3, true), (1, true)), Some(Second));
        assert_eq!(border_authority((2, true), (2, false)), Some(First));
        assert_eq!(border_authority((2, false), (2, true)), Some(Second));
        assert_eq!(border_authority((2, true), (2, true)), None);
    }

    /// Fill `chunk` with a flat grid mesh at `level`, offset along z.
    fn fill(chunk: &mut Chunk, templates: &PlaneTemplateCache, level: u8, z: f32, pending: bool) {
        let template = templates.get(level).unwrap();
        let positions: Vec<Vec3> = template.uvs().iter().map(|uv| uv.extend(z)).collect();
        let colors = vec![Vec4::ONE; positions.len()];
        chunk.apply(template, &positions, &colors);
        chunk.mesh_update_pending = pending;
    }

    fn border_positions(chunk: &Chunk, templates: &PlaneTemplateCache, side: Side) -> Vec<Vec3> {
        let template = templates.get(chunk.current_lod.unwrap()).unwrap();
        template
            .border(side)
            .iter()
            .map(|&i| chunk.mesh.positions[i as usize])
            .collect()
    }

    #[test]
    fn test_finer_neighbor_follows_coarser() {
        let templates = PlaneTemplateCache::new(4);
        let mut chunks = build_chunks(0);
        let side = Side::Right;
        let border = chunks[0].border(side);
        fill(&mut chunks[0], &templates, 1, 5.0, true);
        fill(&mut chunks[border.neighbor], &templates, 3, -5.0, false);

        let stitched = stitch_borders(&mut chunks, &templates);
        assert_eq!(stitched, 1);

        let lower: Vec<Vec3> = border_positions(&chunks[0], &templates, side).into_iter().rev().collect();
        let higher = border_positions(&chunks[border.neighbor], &templates, border.neighbor_side);
        assert_eq!(higher.len(), 9);
        for (k, coarse) in lower.iter().enumerate() {
            assert_eq!(higher[k * 4], *coarse);
        }
        assert_eq!(higher[2], lower[0].lerp(lower[1], 0.5));
        // The coarse chunk is untouched.
        assert!(chunks[0].mesh.positions.iter().all(|p| p.z == 5.0));
    }

    #[test]
    fn test_unchanged_pairs_are_skipped() {
        let templates = PlaneTemplateCache::new(3);
        let mut chunks = build_chunks(0);
        for (i, chunk) in chunks.iter_mut().enumerate() {
            fill(chunk, &templates, (i % 3) as u8, i as f32, false);
        }
        assert_eq!(stitch_borders(&mut chunks, &templates), 0);
    }

    #[test]
    fn test_chunks_without_mesh_are_skipped() {
        let templates = PlaneTemplateCache::new(3);
        let mut chunks = build_chunks(0);
        fill(&mut chunks[0], &templates, 2, 0.0, true);
        assert_eq!(stitch_borders(&mut chunks, &templates), 0);
    }

    #[test]
    fn test_equal_level_copies_from_rebuilt_chunk() {
        let templates = PlaneTemplateCache::new(3);
        let mut chunks = build_chunks(0);
        let side = Side::Bottom;
        let border = chunks[3].border(side);
        fill(&mut chunks[3], &templates, 2, 1.0, false);
        fill(&mut chunks[border.neighbor], &templates, 2, 7.0, true);

        assert_eq!(stitch_borders(&mut chunks, &templates), 1);
        let settled: Vec<Vec3> = border_positions(&chunks[3], &templates, side).into_iter().rev().collect();
        let rebuilt = border_positions(&chunks[border.neighbor], &templates, border.neighbor_side);
        assert_eq!(settled, rebuilt);
        assert!(rebuilt.iter().all(|p| p.z == 7.0));
    }

    /// Evaluate `chunk` at `level` on a bumpy sphere.
    fn evaluate(chunk: &mut Chunk, templates: &PlaneTemplateCache, level: u8) {
        let template = templates.get(level).unwrap();
        let positions: Vec<Vec3> = template
            .uvs()
            .iter()
            .map(|uv| bumpy(chunk.bounds.direction(uv.x, uv.y)))
            .collect();
        let colors = vec![Vec4::ONE; positions.len()];
        chunk.apply(template, &positions, &colors);
    }

    fn bumpy(direction: Vec3) -> Vec3 {
        direction * (1.0 + 0.1 * (9.0 * direction.x).sin() * (7.0 * direction.y).cos())
    }

    fn clear_pending(chunks: &mut [Chunk]) {
        for chunk in chunks {
            chunk.mesh_update_pending = false;
        }
    }

    #[test]
    fn test_refined_neighbor_keeps_its_evaluated_border() {
        let templates = PlaneTemplateCache::new(4);
        let mut chunks = build_chunks(0);
        let side = Side::Right;
        let border = chunks[0].border(side);
        let neighbor = border.neighbor;

        // Fine chunk next to a coarse one: the fine border becomes an
        // interpolation of the coarse edge.
        evaluate(&mut chunks[0], &templates, 3);
        evaluate(&mut chunks[neighbor], &templates, 1);
        assert_eq!(stitch_borders(&mut chunks, &templates), 1);
        clear_pending(&mut chunks);

        // The neighbor refines to the same level.
        evaluate(&mut chunks[neighbor], &templates, 3);
        let evaluated = border_positions(&chunks[neighbor], &templates, border.neighbor_side);
        assert_eq!(stitch_borders(&mut chunks, &templates), 1);
        clear_pending(&mut chunks);

        let refined = border_positions(&chunks[neighbor], &templates, border.neighbor_side);
        assert_eq!(refined, evaluated);
        let settled: Vec<Vec3> = border_positions(&chunks[0], &templates, side).into_iter().rev().collect();
        assert_eq!(settled, refined);
        // The fine chunk's edge is back on the surface, not on the coarse chord.
        for p in &settled {
            assert!((*p - bumpy(p.normalize())).length() < 1e-5);
        }
    }

    #[test]
    fn test_every_face_edge_visited_once() {
        let templates = PlaneTemplateCache::new(2);
        let mut chunks = build_chunks(0);
        for (i, chunk) in chunks.iter_mut().enumerate() {
            fill(chunk, &templates, 1, 0.0, i == 0);
        }
        // Face 0 borders four faces at the same level; each edge once.
        assert_eq!(stitch_borders(&mut chunks, &templates), 4);
    }
}
