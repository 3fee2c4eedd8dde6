use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.x.into(), self.y.into()]
    }
}

impl ToNdIndex for Bounds {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.rows.into(), self.cols.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Board coordinates, `x` is the row and `y` the column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: Coord,
    y: Coord,
}

impl Position {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub const fn x(self) -> Coord {
        self.x
    }

    pub const fn y(self) -> Coord {
        self.y
    }

    pub const fn is_within(self, bounds: Bounds) -> bool {
        self.x < bounds.rows && self.y < bounds.cols
    }

    /// Chebyshev distance of exactly one, a position is never adjacent to itself.
    pub fn is_adjacent_to(self, other: Position) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx > 0 || dy > 0)
    }

    pub fn manhattan_distance_to(self, other: Position) -> CellCount {
        CellCount::from(self.x.abs_diff(other.x)) + CellCount::from(self.y.abs_diff(other.y))
    }

    /// Up to 8 surrounding positions clipped to `bounds`, in row-major order.
    ///
    /// The center itself is not checked. An out-of-bounds center still yields whichever of
    /// its neighbors fall inside `bounds`, [`NeighborService::neighbor_positions`] rejects it.
    ///
    /// [`NeighborService::neighbor_positions`]: crate::NeighborService::neighbor_positions
    pub fn neighbors(self, bounds: Bounds) -> NeighborIter {
        NeighborIter::new(self, bounds)
    }

    pub fn to_key(self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

impl From<Coord2> for Position {
    fn from((x, y): Coord2) -> Self {
        Self::new(x, y)
    }
}

impl From<Position> for Coord2 {
    fn from(position: Position) -> Self {
        (position.x, position.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({}, {})", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = GameError;

    /// Parses the `"x,y"` key form produced by [`Position::to_key`].
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidPositionKey(key.to_owned());
        let (x, y) = key.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// Extent of a board, `rows` along `x` and `cols` along `y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    rows: Coord,
    cols: Coord,
}

impl Bounds {
    /// # Panics
    ///
    /// Panics if either dimension is zero, an empty board is a caller bug.
    pub fn new(rows: Coord, cols: Coord) -> Self {
        assert!(
            rows > 0 && cols > 0,
            "board bounds must be non-empty, got {rows}x{cols}"
        );
        Self { rows, cols }
    }

    pub const fn rows(self) -> Coord {
        self.rows
    }

    pub const fn cols(self) -> Coord {
        self.cols
    }

    pub const fn total_cells(self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub const fn contains(self, position: Position) -> bool {
        position.is_within(self)
    }

    /// Every position on the board in row-major order.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        (0..self.rows).flat_map(move |x| (0..self.cols).map(move |y| Position::new(x, y)))
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `position`, returning a value only when it remains in bounds.
fn apply_delta(position: Position, delta: (i8, i8), bounds: Bounds) -> Option<Position> {
    let (dx, dy) = delta;

    let next_x = position.x.checked_add_signed(dx)?;
    if next_x >= bounds.rows {
        return None;
    }

    let next_y = position.y.checked_add_signed(dy)?;
    if next_y >= bounds.cols {
        return None;
    }

    Some(Position::new(next_x, next_y))
}

#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Position,
    bounds: Bounds,
    index: u8,
}

impl NeighborIter {
    fn new(center: Position, bounds: Bounds) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let delta = *DISPLACEMENTS.get(usize::from(self.index))?;
            self.index += 1;

            if let Some(next_item) = apply_delta(self.center, delta, self.bounds) {
                return Some(next_item);
            }
        }
    }
}
