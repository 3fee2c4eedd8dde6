use core::ops::Index;
use hashbrown::{HashMap, HashSet};
use ndarray::Array2;
use serde::Serialize;

use crate::*;

pub(crate) fn to_count(n: usize) -> CellCount {
    CellCount::try_from(n).unwrap_or(CellCount::MAX)
}

/// Fixed-size grid of cells with a secondary id index.
///
/// Mines go in first, then [`NeighborService::calculate_mine_counts_for_board`] seals the
/// board. A sealed board accepts no more mines and is the only kind that can be played.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    bounds: Bounds,
    cells: Array2<Cell>,
    index: HashMap<CellId, Position>,
    sealed: bool,
}

impl Board {
    /// Builds an empty board, asking `id_for` for the id of every cell in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `id_for` produces a blank or duplicate id.
    pub fn new(bounds: Bounds, mut id_for: impl FnMut(Position) -> CellId) -> Self {
        let mut index = HashMap::with_capacity(bounds.total_cells().into());
        let cells = Array2::from_shape_fn(bounds.to_nd_index(), |(x, y)| {
            let position = Position::new(x as Coord, y as Coord);
            let id = id_for(position);
            assert!(
                index.insert(id.clone(), position).is_none(),
                "cell id '{id}' is not unique"
            );
            Cell::new(id, position)
        });

        Self {
            bounds,
            cells,
            index,
            sealed: false,
        }
    }

    pub fn with_default_ids(bounds: Bounds) -> Self {
        Self::new(bounds, CellId::for_position)
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn validate_position(&self, position: Position) -> Result<Position> {
        if self.bounds.contains(position) {
            Ok(position)
        } else {
            Err(GameError::OutOfBounds(position))
        }
    }

    pub fn cell_at(&self, position: Position) -> Result<&Cell> {
        let position = self.validate_position(position)?;
        Ok(&self.cells[position.to_nd_index()])
    }

    pub(crate) fn cell_at_mut(&mut self, position: Position) -> Result<&mut Cell> {
        let position = self.validate_position(position)?;
        Ok(&mut self.cells[position.to_nd_index()])
    }

    pub fn position_of(&self, id: &str) -> Result<Position> {
        if !CellId::is_valid(id) {
            return Err(GameError::InvalidCellId);
        }
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GameError::UnknownCell(id.to_owned()))
    }

    pub fn cell_by_id(&self, id: &str) -> Result<&Cell> {
        let position = self.position_of(id)?;
        self.cell_at(position)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn all_cells(&self) -> Vec<&Cell> {
        self.cells().collect()
    }

    pub fn mine_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|cell| cell.contains_mine()).collect()
    }

    pub fn non_mine_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|cell| !cell.contains_mine()).collect()
    }

    pub fn flagged_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|cell| cell.is_flagged()).collect()
    }

    pub fn revealed_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|cell| cell.is_revealed()).collect()
    }

    pub fn hidden_cells(&self) -> Vec<&Cell> {
        self.cells().filter(|cell| cell.is_hidden()).collect()
    }

    pub fn count_cells(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        to_count(self.cells().filter(|&cell| predicate(cell)).count())
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_cells(Cell::contains_mine)
    }

    pub fn place_mine(&mut self, position: Position) -> Result<Position> {
        self.check_not_sealed()?;
        self.cell_at_mut(position)?.set_as_mine()?;
        log::trace!("Placed mine at {}", position);
        Ok(position)
    }

    /// Places every mine or none of them.
    pub fn place_mines(&mut self, positions: &[Position]) -> Result<CellCount> {
        self.check_not_sealed()?;

        let mut seen = HashSet::with_capacity(positions.len());
        for &position in positions {
            if self.cell_at(position)?.contains_mine() {
                return Err(RuleViolation::AlreadyMined.into());
            }
            if !seen.insert(position) {
                return Err(GameError::DuplicateMinePosition(position));
            }
        }

        for &position in positions {
            self.place_mine(position)?;
        }
        Ok(to_count(positions.len()))
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            bounds: self.bounds,
            cells: self.cells().map(Cell::snapshot).collect(),
        }
    }

    pub(crate) fn seal(&mut self) -> Result<()> {
        self.check_not_sealed()?;
        self.sealed = true;
        Ok(())
    }

    fn check_not_sealed(&self) -> Result<()> {
        if self.sealed {
            Err(GameError::BoardSealed)
        } else {
            Ok(())
        }
    }
}

/// # Panics
///
/// Panics if `position` is out of bounds, use [`Board::cell_at`] for untrusted input.
impl Index<Position> for Board {
    type Output = Cell;

    fn index(&self, position: Position) -> &Self::Output {
        &self.cells[position.to_nd_index()]
    }
}

/// Produces empty boards with a fixed cell id scheme.
#[derive(Copy, Clone, Debug)]
pub struct BoardFactory {
    id_scheme: fn(Position) -> CellId,
}

impl BoardFactory {
    pub fn new(id_scheme: fn(Position) -> CellId) -> Self {
        Self { id_scheme }
    }

    pub fn create(&self, bounds: Bounds) -> Board {
        Board::new(bounds, self.id_scheme)
    }
}

impl Default for BoardFactory {
    fn default() -> Self {
        Self::new(CellId::for_position)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardSnapshot {
    pub bounds: Bounds,
    pub cells: Vec<CellSnapshot>,
}
