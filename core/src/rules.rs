use crate::*;

/// Pure predicates over cells and boards.
#[derive(Copy, Clone, Debug, Default)]
pub struct GameRules;

impl GameRules {
    pub fn can_reveal_cell(&self, cell: &Cell) -> bool {
        cell.can_be_revealed()
    }

    pub fn can_flag_cell(&self, cell: &Cell) -> bool {
        cell.can_be_flagged()
    }

    pub fn is_game_lost(&self, board: &Board) -> bool {
        board
            .cells()
            .any(|cell| cell.contains_mine() && cell.is_exploded())
    }

    /// Every safe cell is revealed and no mine is uncovered. Mines may still be hidden or flagged.
    pub fn is_game_won(&self, board: &Board) -> bool {
        board.cells().all(|cell| {
            if cell.contains_mine() {
                !cell.is_revealed() && !cell.is_exploded()
            } else {
                cell.is_revealed()
            }
        })
    }

    /// Loss takes precedence over win.
    pub fn evaluate(&self, board: &Board) -> GameResult {
        if self.is_game_lost(board) {
            GameResult::Lost
        } else if self.is_game_won(board) {
            GameResult::Won
        } else {
            GameResult::None
        }
    }

    pub fn is_valid_board_size(&self, rows: Coord, cols: Coord) -> bool {
        let sizes = MIN_BOARD_SIZE..=MAX_BOARD_SIZE;
        sizes.contains(&rows) && sizes.contains(&cols)
    }

    pub fn is_valid_mine_count(&self, mines: CellCount, total: CellCount) -> bool {
        mines > 0 && mines < total
    }

    /// Mine count for `percentage` of the board, rounded down and kept within `1..total`.
    pub fn optimal_mine_count(&self, rows: Coord, cols: Coord, percentage: f64) -> CellCount {
        let total = mult(rows, cols);
        let mines = (f64::from(total) * percentage / 100.0).floor();
        // float to int casts saturate, NaN becomes 0
        (mines as CellCount).min(total.saturating_sub(1)).max(1)
    }

    pub fn validate_configuration(&self, rows: Coord, cols: Coord, mines: CellCount) -> Result<()> {
        if !self.is_valid_board_size(rows, cols) {
            return Err(GameError::InvalidBoardSize { rows, cols });
        }

        let total = mult(rows, cols);
        if !self.is_valid_mine_count(mines, total) {
            return Err(GameError::InvalidMineCount { mines, total });
        }

        Ok(())
    }
}
