//! Boundary predicates for floor subdivisions: the four sides (4) and the
//! four corners (4) of a land cell's patch.
//!
//! A subdivision touches the island boundary on a side when it is in the
//! outermost row or column of its patch and the neighbouring cell on that
//! side is void or outside the grid. A corner only counts when the diagonal
//! neighbour exists and is void; outside diagonals are already covered by
//! the sides.

use atoll_terrain::Grid;

/// One side of a cell patch. `Top` faces `-z` (grid `y - 1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// −X side.
    Left = 0,
    /// −Z side.
    Top = 1,
    /// +X side.
    Right = 2,
    /// +Z side.
    Bottom = 3,
}

impl Side {
    /// All four sides, in pinning order.
    pub const ALL: [Side; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    /// Grid offset of the neighbour across this side.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Self::Left => (-1, 0),
            Self::Top => (0, -1),
            Self::Right => (1, 0),
            Self::Bottom => (0, 1),
        }
    }

    /// The two quad corners lying on this side.
    pub fn corners(self) -> [QuadCorner; 2] {
        match self {
            Self::Left => [QuadCorner::TopLeft, QuadCorner::BottomLeft],
            Self::Top => [QuadCorner::TopLeft, QuadCorner::TopRight],
            Self::Right => [QuadCorner::TopRight, QuadCorner::BottomRight],
            Self::Bottom => [QuadCorner::BottomRight, QuadCorner::BottomLeft],
        }
    }
}

/// A corner of a floor quad. The discriminant is the vertex's position in
/// the quad (`tl, tr, br, bl`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum QuadCorner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl QuadCorner {
    /// All four corners in quad order.
    pub const ALL: [QuadCorner; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Position of this corner's vertex within its quad.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset of this corner on the subdivided lattice, `(dx, dz)`.
    pub fn lattice_offset(self) -> (u32, u32) {
        match self {
            Self::TopLeft => (0, 0),
            Self::TopRight => (1, 0),
            Self::BottomRight => (1, 1),
            Self::BottomLeft => (0, 1),
        }
    }

    /// Grid offset of the diagonal neighbour this corner faces.
    fn diagonal(self) -> (i64, i64) {
        match self {
            Self::TopLeft => (-1, -1),
            Self::TopRight => (1, -1),
            Self::BottomRight => (1, 1),
            Self::BottomLeft => (-1, 1),
        }
    }

    /// Whether subdivision `(sx, sz)` is this corner's subdivision.
    fn owns(self, sx: u32, sz: u32, subdivision: u32) -> bool {
        let last = subdivision - 1;
        match self {
            Self::TopLeft => sx == 0 && sz == 0,
            Self::TopRight => sx == last && sz == 0,
            Self::BottomRight => sx == last && sz == last,
            Self::BottomLeft => sx == 0 && sz == last,
        }
    }
}

fn is_void(grid: &Grid<u32>, x: i64, y: i64) -> bool {
    grid.get(x, y).is_none_or(|level| *level == 0)
}

/// Whether subdivision `(sx, sz)` of cell `(i, j)` lies on `side` of the
/// island boundary.
pub fn on_side(grid: &Grid<u32>, i: usize, j: usize, sx: u32, sz: u32, subdivision: u32, side: Side) -> bool {
    let last = subdivision - 1;
    let in_row = match side {
        Side::Left => sx == 0,
        Side::Top => sz == 0,
        Side::Right => sx == last,
        Side::Bottom => sz == last,
    };
    let (dx, dy) = side.offset();
    in_row && is_void(grid, i as i64 + dx, j as i64 + dy)
}

/// The concave corner subdivision `(sx, sz)` of cell `(i, j)` sits on, if
/// any. Only the first matching corner in quad order is reported.
pub fn corner_at(grid: &Grid<u32>, i: usize, j: usize, sx: u32, sz: u32, subdivision: u32) -> Option<QuadCorner> {
    QuadCorner::ALL.into_iter().find(|corner| {
        let (dx, dy) = corner.diagonal();
        corner.owns(sx, sz, subdivision) && grid.get(i as i64 + dx, j as i64 + dy) == Some(&0)
    })
}
