//! The six faces of the base cube, their corners, and their adjacency.

use glam::Vec3;

use crate::{ChunkBorder, ChunkBounds, Side};

/// Corner coordinate of a cube inscribed in the unit sphere (1/√3).
const S: f32 = 0.577_350_26;

/// The six faces of the cube that forms the cubesphere.
///
/// The discriminant is the face's index in the depth-0 chunk list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CubeFace {
    /// +Y face
    Top = 0,
    /// +X face
    Front = 1,
    /// +Z face
    Right = 2,
    /// −X face
    Back = 3,
    /// −Z face
    Left = 4,
    /// −Y face
    Bottom = 5,
}

impl CubeFace {
    /// All six faces in chunk-list order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Top,
        CubeFace::Front,
        CubeFace::Right,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Bottom,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The opposite face (e.g., `Front` → `Back`).
    #[must_use]
    pub const fn opposite(self) -> CubeFace {
        match self {
            CubeFace::Top => CubeFace::Bottom,
            CubeFace::Front => CubeFace::Back,
            CubeFace::Right => CubeFace::Left,
            CubeFace::Back => CubeFace::Front,
            CubeFace::Left => CubeFace::Right,
            CubeFace::Bottom => CubeFace::Top,
        }
    }

    /// Outward-pointing unit normal for this face.
    #[must_use]
    pub const fn normal(self) -> Vec3 {
        match self {
            CubeFace::Top => Vec3::Y,
            CubeFace::Front => Vec3::X,
            CubeFace::Right => Vec3::Z,
            CubeFace::Back => Vec3::NEG_X,
            CubeFace::Left => Vec3::NEG_Z,
            CubeFace::Bottom => Vec3::NEG_Y,
        }
    }

    /// Corner directions of the whole face, already on the unit sphere.
    #[must_use]
    pub const fn bounds(self) -> ChunkBounds {
        let (tl, tr, bl, br) = match self {
            CubeFace::Top => ([-S, S, -S], [-S, S, S], [S, S, -S], [S, S, S]),
            CubeFace::Front => ([S, S, -S], [S, S, S], [S, -S, -S], [S, -S, S]),
            CubeFace::Right => ([S, S, S], [-S, S, S], [S, -S, S], [-S, -S, S]),
            CubeFace::Back => ([-S, S, S], [-S, S, -S], [-S, -S, S], [-S, -S, -S]),
            CubeFace::Left => ([-S, S, -S], [S, S, -S], [-S, -S, -S], [S, -S, -S]),
            CubeFace::Bottom => ([S, -S, -S], [S, -S, S], [-S, -S, -S], [-S, -S, S]),
        };
        ChunkBounds::new(
            Vec3::from_array(tl),
            Vec3::from_array(tr),
            Vec3::from_array(bl),
            Vec3::from_array(br),
        )
    }

    /// Neighbors of this face, indexed by [`Side::index`].
    #[must_use]
    pub const fn borders(self) -> [ChunkBorder; 4] {
        use CubeFace as F;
        use Side::{Bottom, Left, Right, Top};

        let table = match self {
            F::Top => [(F::Back, Top), (F::Right, Top), (F::Front, Top), (F::Left, Top)],
            F::Front => [(F::Top, Bottom), (F::Right, Left), (F::Bottom, Top), (F::Left, Right)],
            F::Right => [(F::Top, Right), (F::Back, Left), (F::Bottom, Right), (F::Front, Right)],
            F::Back => [(F::Top, Top), (F::Left, Left), (F::Bottom, Bottom), (F::Right, Right)],
            F::Left => [(F::Top, Left), (F::Front, Left), (F::Bottom, Left), (F::Back, Right)],
            F::Bottom => [
                (F::Front, Bottom),
                (F::Right, Bottom),
                (F::Back, Bottom),
                (F::Left, Bottom),
            ],
        };
        [
            ChunkBorder::new(table[0].0.index(), table[0].1),
            ChunkBorder::new(table[1].0.index(), table[1].1),
            ChunkBorder::new(table[2].0.index(), table[2].1),
            ChunkBorder::new(table[3].0.index(), table[3].1),
        ]
    }
}
