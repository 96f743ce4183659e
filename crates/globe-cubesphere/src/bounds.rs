//! Spherical quadrilateral bounds of a chunk.

use glam::Vec3;

use crate::{Quadrant, Side};

/// The four corner directions of a chunk on the unit sphere.
///
/// Corners are named as seen from outside the sphere. `u` runs from the
/// left corners to the right corners, `v` from the top corners to the
/// bottom corners, and `(tr - tl) x (bl - tl)` points away from the planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub top_left: Vec3,
    pub top_right: Vec3,
    pub bottom_left: Vec3,
    pub bottom_right: Vec3,
}

impl ChunkBounds {
    #[must_use]
    pub const fn new(top_left: Vec3, top_right: Vec3, bottom_left: Vec3, bottom_right: Vec3) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// The corner at the given quadrant position.
    #[must_use]
    pub const fn corner(&self, quadrant: Quadrant) -> Vec3 {
        match quadrant {
            Quadrant::TopLeft => self.top_left,
            Quadrant::TopRight => self.top_right,
            Quadrant::BottomLeft => self.bottom_left,
            Quadrant::BottomRight => self.bottom_right,
        }
    }

    /// Arithmetic mean of the four corners. Not normalized.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.top_left + self.top_right + self.bottom_left + self.bottom_right) * 0.25
    }

    /// Start and end corner of `side`, in clockwise traversal order.
    #[must_use]
    pub const fn edge(&self, side: Side) -> (Vec3, Vec3) {
        match side {
            Side::Top => (self.top_left, self.top_right),
            Side::Right => (self.top_right, self.bottom_right),
            Side::Bottom => (self.bottom_right, self.bottom_left),
            Side::Left => (self.bottom_left, self.top_left),
        }
    }

    /// Bilinear blend of the corners. `(0, 0)` is the top-left corner.
    ///
    /// Blends as `a * (1 - t) + b * t`, which is exact at `t = 0` and
    /// `t = 1`, so two chunks evaluating the same point of a shared edge
    /// from opposite directions get bit-identical results. The result lies
    /// inside the sphere; normalize it to get a surface direction.
    #[must_use]
    pub fn interpolate(&self, u: f32, v: f32) -> Vec3 {
        let top = mix(self.top_left, self.top_right, u);
        let bottom = mix(self.bottom_left, self.bottom_right, u);
        mix(top, bottom, v)
    }

    /// Unit direction through the bilinear point `(u, v)`.
    #[must_use]
    pub fn direction(&self, u: f32, v: f32) -> Vec3 {
        self.interpolate(u, v).normalize()
    }

    /// Split into four child bounds, indexed by [`Quadrant::index`].
    ///
    /// Edge midpoints are `normalize(a + b)` of the two edge corners, so two
    /// chunks sharing an edge produce bit-identical midpoints regardless of
    /// the direction they traverse it in.
    #[must_use]
    pub fn split(&self) -> [ChunkBounds; 4] {
        let tl = self.top_left;
        let tr = self.top_right;
        let bl = self.bottom_left;
        let br = self.bottom_right;

        let top = (tl + tr).normalize();
        let right = (tr + br).normalize();
        let bottom = (br + bl).normalize();
        let left = (bl + tl).normalize();
        let center = (tl + tr + br + bl).normalize();

        [
            ChunkBounds::new(tl, top, left, center),
            ChunkBounds::new(top, tr, center, right),
            ChunkBounds::new(left, center, bl, bottom),
            ChunkBounds::new(center, right, bottom, br),
        ]
    }
}

fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ChunkBounds {
        let s = 1.0 / 3.0_f32.sqrt();
        ChunkBounds::new(
            Vec3::new(-s, s, -s),
            Vec3::new(-s, s, s),
            Vec3::new(s, s, -s),
            Vec3::new(s, s, s),
        )
    }

    #[test]
    fn test_interpolate_hits_corners() {
        let b = square();
        assert_eq!(b.interpolate(0.0, 0.0), b.top_left);
        assert_eq!(b.interpolate(1.0, 0.0), b.top_right);
        assert_eq!(b.interpolate(0.0, 1.0), b.bottom_left);
        assert_eq!(b.interpolate(1.0, 1.0), b.bottom_right);
    }

    #[test]
    fn test_direction_is_unit_length() {
        let b = square();
        for (u, v) in [(0.5, 0.5), (0.25, 0.75), (1.0, 0.0), (0.1, 0.9)] {
            assert!((b.direction(u, v).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_center_of_square_points_along_face() {
        let c = square().center();
        assert!(c.x.abs() < 1e-6 && c.z.abs() < 1e-6);
        assert!(c.y > 0.0);
    }

    #[test]
    fn test_edges_chain_clockwise() {
        let b = square();
        for side in Side::ALL {
            let next = Side::ALL[(side.index() + 1) % 4];
            assert_eq!(b.edge(side).1, b.edge(next).0);
        }
    }

    #[test]
    fn test_split_keeps_parent_corners() {
        let b = square();
        let children = b.split();
        for q in Quadrant::ALL {
            assert_eq!(children[q.index()].corner(q), b.corner(q));
        }
    }

    /// Child edges along a parent side cover the parent edge in order.
    #[test]
    fn test_split_children_follow_parent_edges() {
        let b = square();
        let children = b.split();
        for side in Side::ALL {
            let [first, second] = side.children();
            let (start, end) = b.edge(side);
            let (a0, a1) = children[first.index()].edge(side);
            let (b0, b1) = children[second.index()].edge(side);
            assert_eq!(a0, start);
            assert_eq!(a1, b0);
            assert_eq!(b1, end);
        }
    }

    #[test]
    fn test_split_points_lie_on_sphere() {
        for child in square().split() {
            for q in Quadrant::ALL {
                assert!((child.corner(q).length() - 1.0).abs() < 1e-6);
            }
        }
    }
}
