//! Uniform quadtree subdivision of the base cube into a flat chunk list.
//!
//! Every chunk at depth `D` carries its four bounds corners and, per side,
//! the index of the neighbor sharing that edge plus the neighbor's side.
//! Children of the parent at index `j` live at `4j..4j + 4`, ordered by
//! [`Quadrant`]. Neighbor links across parent boundaries are remapped so
//! that every link is reciprocal and every shared edge is traversed in
//! opposite directions by its two chunks.

use glam::Vec3;

use crate::{ChunkBorder, ChunkBounds, CubeFace, Quadrant, Side};

/// A chunk of the subdivided cube with its neighbor links.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkNode {
    pub bounds: ChunkBounds,
    /// Neighbor links indexed by [`Side::index`].
    pub borders: [ChunkBorder; 4],
}

impl ChunkNode {
    #[must_use]
    pub const fn border(&self, side: Side) -> ChunkBorder {
        self.borders[side.index()]
    }

    /// Arithmetic mean of the bounds corners.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }
}

/// Number of chunks produced at recursion depth `depth`: `6·4^depth`.
#[must_use]
pub const fn chunk_count(depth: u32) -> usize {
    6 << (2 * depth)
}

/// Index of `quadrant`'s child of the parent at `parent`.
#[must_use]
pub const fn child_index(parent: usize, quadrant: Quadrant) -> usize {
    parent * 4 + quadrant.index()
}

/// The six cube faces as depth-0 chunks.
#[must_use]
pub fn base_chunks() -> Vec<ChunkNode> {
    CubeFace::ALL
        .iter()
        .map(|face| ChunkNode {
            bounds: face.bounds(),
            borders: face.borders(),
        })
        .collect()
}

/// Split every parent into four children, preserving neighbor links.
#[must_use]
pub fn subdivide(parents: &[ChunkNode]) -> Vec<ChunkNode> {
    let mut children = Vec::with_capacity(parents.len() * 4);

    for (parent_index, parent) in parents.iter().enumerate() {
        let split = parent.bounds.split();

        for quadrant in Quadrant::ALL {
            let borders = Side::ALL.map(|side| match quadrant.sibling_across(side) {
                Some(sibling) => ChunkBorder::new(child_index(parent_index, sibling), side.opposite()),
                None => {
                    let outer = parent.border(side);
                    // Every quadrant without a sibling on `side` touches it.
                    let position = quadrant.position_along(side).unwrap_or_default();
                    let half = outer.neighbor_side.neighbor_halves()[position];
                    ChunkBorder::new(child_index(outer.neighbor, half), outer.neighbor_side)
                }
            });

            children.push(ChunkNode {
                bounds: split[quadrant.index()],
                borders,
            });
        }
    }

    children
}

/// Produce the flat chunk list for recursion depth `depth`.
#[must_use]
pub fn generate_chunks(depth: u32) -> Vec<ChunkNode> {
    let mut chunks = base_chunks();
    for _ in 0..depth {
        chunks = subdivide(&chunks);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_counts() {
        for depth in 0..=5 {
            let chunks = generate_chunks(depth);
            assert_eq!(chunks.len(), chunk_count(depth));
            assert_eq!(chunks.len(), 6 * 4usize.pow(depth));
        }
    }

    #[test]
    fn test_depth_zero_is_base_cube() {
        let chunks = generate_chunks(0);
        for face in CubeFace::ALL {
            assert_eq!(chunks[face.index()].bounds, face.bounds());
            assert_eq!(chunks[face.index()].borders, face.borders());
        }
    }

    /// If A's side k points at (B, s), B's side s points back at (A, k).
    #[test]
    fn test_neighbor_links_are_reciprocal() {
        for depth in 0..=5 {
            let chunks = generate_chunks(depth);
            for (index, chunk) in chunks.iter().enumerate() {
                for side in Side::ALL {
                    let border = chunk.border(side);
                    assert!(border.neighbor < chunks.len());
                    assert_ne!(border.neighbor, index, "depth {depth}: self link");
                    let back = chunks[border.neighbor].border(border.neighbor_side);
                    assert_eq!(
                        (back.neighbor, back.neighbor_side),
                        (index, side),
                        "depth {depth}: chunk {index} side {side:?}"
                    );
                }
            }
        }
    }

    /// The corners of a shared edge match bit for bit, in reversed order.
    #[test]
    fn test_shared_edge_corners_are_identical() {
        for depth in 0..=4 {
            let chunks = generate_chunks(depth);
            for chunk in &chunks {
                for side in Side::ALL {
                    let border = chunk.border(side);
                    let (a0, a1) = chunk.bounds.edge(side);
                    let (b0, b1) = chunks[border.neighbor].bounds.edge(border.neighbor_side);
                    assert_eq!(a0, b1, "depth {depth}");
                    assert_eq!(a1, b0, "depth {depth}");
                }
            }
        }
    }

    #[test]
    fn test_four_distinct_neighbors() {
        for depth in 0..=3 {
            for chunk in generate_chunks(depth) {
                let mut neighbors: Vec<usize> = chunk.borders.iter().map(|b| b.neighbor).collect();
                neighbors.sort_unstable();
                neighbors.dedup();
                assert_eq!(neighbors.len(), 4, "depth {depth}");
            }
        }
    }

    #[test]
    fn test_children_are_grouped_by_parent() {
        let parents = generate_chunks(1);
        let children = subdivide(&parents);
        for (j, parent) in parents.iter().enumerate() {
            for q in Quadrant::ALL {
                let child = &children[child_index(j, q)];
                assert_eq!(child.bounds.corner(q), parent.bounds.corner(q));
            }
        }
    }

    #[test]
    fn test_all_corners_on_unit_sphere() {
        for chunk in generate_chunks(4) {
            for q in Quadrant::ALL {
                assert!((chunk.bounds.corner(q).length() - 1.0).abs() < 1e-5);
            }
        }
    }

    /// Two distinct chunks share exactly one edge when they are neighbors,
    /// and that edge's endpoints agree to within float noise.
    #[test]
    fn test_neighbors_share_one_edge() {
        let chunks = generate_chunks(2);
        for (index, chunk) in chunks.iter().enumerate() {
            for side in Side::ALL {
                let other = &chunks[chunk.border(side).neighbor];
                let mut shared = 0;
                for s in Side::ALL {
                    for t in Side::ALL {
                        let (a0, a1) = chunk.bounds.edge(s);
                        let (b0, b1) = other.bounds.edge(t);
                        if a0.distance(b1) < 1e-5 && a1.distance(b0) < 1e-5 {
                            shared += 1;
                        }
                    }
                }
                assert_eq!(shared, 1, "chunk {index} side {side:?}");
            }
        }
    }

    /// Bounds keep their outward winding through subdivision.
    #[test]
    fn test_children_wind_outward() {
        for chunk in generate_chunks(3) {
            let b = chunk.bounds;
            let n = (b.top_right - b.top_left).cross(b.bottom_left - b.top_left);
            assert!(n.dot(chunk.center()) > 0.0);
        }
    }
}
