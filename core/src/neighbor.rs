use smallvec::SmallVec;

use crate::*;

/// Up to 8 neighbor positions, kept inline.
pub type NeighborPositions = SmallVec<[Position; 8]>;

/// Stateless neighbor lookups and the one-time neighbor mine count pass.
#[derive(Copy, Clone, Debug, Default)]
pub struct NeighborService;

impl NeighborService {
    pub fn neighbor_positions(position: Position, bounds: Bounds) -> Result<NeighborPositions> {
        if !bounds.contains(position) {
            return Err(GameError::OutOfBounds(position));
        }
        Ok(position.neighbors(bounds).collect())
    }

    pub fn neighbor_cells(board: &Board, position: Position) -> Result<Vec<&Cell>> {
        Self::neighbor_positions(position, board.bounds())?
            .into_iter()
            .map(|neighbor| board.cell_at(neighbor))
            .collect()
    }

    pub fn count_mines_in_neighbors<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> u8 {
        let count = cells.into_iter().filter(|cell| cell.contains_mine()).count();
        u8::try_from(count).unwrap_or(u8::MAX)
    }

    /// Stores the mined-neighbor count on every non-mine cell and seals the board.
    ///
    /// Must run exactly once, after every mine is placed and before anything is revealed.
    pub fn calculate_mine_counts_for_board(board: &mut Board) -> Result<()> {
        if board.is_sealed() {
            return Err(GameError::BoardSealed);
        }

        let bounds = board.bounds();
        for position in bounds.positions() {
            if board[position].contains_mine() {
                continue;
            }
            let count = Self::count_mines_in_neighbors(Self::neighbor_cells(board, position)?);
            board.cell_at_mut(position)?.set_neighbor_mine_count(count)?;
        }

        board.seal()?;
        log::debug!(
            "Calculated neighbor mine counts for {} board with {} mines",
            bounds,
            board.mine_count()
        );
        Ok(())
    }
}
