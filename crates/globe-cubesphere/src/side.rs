//! Chunk sides, child quadrants, and the border records that link chunks.

/// One of the four sides of a chunk.
///
/// Sides are traversed clockwise when viewed from outside the sphere:
/// top runs top-left to top-right, right runs top-right to bottom-right,
/// bottom runs bottom-right to bottom-left, left runs bottom-left to top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Side {
    /// All four sides in border-array order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Position of this side in a `[_; 4]` border array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The side facing this one across a chunk.
    #[must_use]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// The two child quadrants touching this side, in traversal order.
    #[must_use]
    pub const fn children(self) -> [Quadrant; 2] {
        match self {
            Side::Top => [Quadrant::TopLeft, Quadrant::TopRight],
            Side::Right => [Quadrant::TopRight, Quadrant::BottomRight],
            Side::Bottom => [Quadrant::BottomRight, Quadrant::BottomLeft],
            Side::Left => [Quadrant::BottomLeft, Quadrant::TopLeft],
        }
    }

    /// Children of a neighbor along its side `self`, paired with our own
    /// first and second child along the shared edge.
    ///
    /// A shared edge is traversed in opposite directions by the two chunks,
    /// so this is [`Side::children`] reversed.
    #[must_use]
    pub const fn neighbor_halves(self) -> [Quadrant; 2] {
        let [first, second] = self.children();
        [second, first]
    }
}

/// One of the four children produced by splitting a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    /// All four quadrants in child order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Offset of this child within its parent's group of four.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn from_row_col(row: usize, col: usize) -> Quadrant {
        match (row, col) {
            (0, 0) => Quadrant::TopLeft,
            (0, _) => Quadrant::TopRight,
            (_, 0) => Quadrant::BottomLeft,
            _ => Quadrant::BottomRight,
        }
    }

    /// The sibling across `side`, or `None` when `side` lies on the parent's
    /// outer edge.
    #[must_use]
    pub const fn sibling_across(self, side: Side) -> Option<Quadrant> {
        let row = self.index() / 2;
        let col = self.index() % 2;
        match side {
            Side::Top if row == 1 => Some(Quadrant::from_row_col(0, col)),
            Side::Bottom if row == 0 => Some(Quadrant::from_row_col(1, col)),
            Side::Left if col == 1 => Some(Quadrant::from_row_col(row, 0)),
            Side::Right if col == 0 => Some(Quadrant::from_row_col(row, 1)),
            _ => None,
        }
    }

    /// Position (0 or 1) of this quadrant along the parent's `side`, in
    /// traversal order. `None` if the quadrant does not touch that side.
    #[must_use]
    pub fn position_along(self, side: Side) -> Option<usize> {
        side.children().iter().position(|&q| q == self)
    }
}

/// Links one side of a chunk to the neighboring chunk sharing that edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkBorder {
    /// Index of the neighbor in the flat chunk list.
    pub neighbor: usize,
    /// Which side of the neighbor touches us.
    pub neighbor_side: Side,
}

impl ChunkBorder {
    #[must_use]
    pub const fn new(neighbor: usize, neighbor_side: Side) -> Self {
        Self {
            neighbor,
            neighbor_side,
        }
    }
}
