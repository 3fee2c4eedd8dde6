use thiserror::Error;

use crate::{CellCount, Coord, Position};

/// A single cell refusing a transition, always recoverable.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Cannot reveal disabled cell")]
    RevealDisabled,
    #[error("Cell is already revealed")]
    AlreadyRevealed,
    #[error("Cannot reveal flagged cell")]
    RevealFlagged,
    #[error("Cannot flag disabled cell")]
    FlagDisabled,
    #[error("Cannot flag revealed cell")]
    FlagRevealed,
    #[error("Only mine cells can explode")]
    NotAMine,
    #[error("Cannot explode disabled cell")]
    ExplodeDisabled,
    #[error("Cell already contains a mine")]
    AlreadyMined,
    #[error("Cannot set neighbor mine count on a mine cell")]
    CountOnMine,
    #[error("Neighbor mine count must be between 0 and 8, got {0}")]
    CountOutOfRange(u8),
    #[error("Cell cannot be revealed according to game rules")]
    NotRevealable,
    #[error("Cell cannot be flagged according to game rules")]
    NotFlaggable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{0} is out of bounds")]
    OutOfBounds(Position),
    #[error("Invalid position key '{0}'")]
    InvalidPositionKey(String),
    #[error("Invalid cell ID provided")]
    InvalidCellId,
    #[error("Cell with ID '{0}' not found")]
    UnknownCell(String),
    #[error("Invalid board size {rows}x{cols}")]
    InvalidBoardSize { rows: Coord, cols: Coord },
    #[error("The percentage of mines must be greater than zero")]
    InvalidMinePercentage,
    #[error("Invalid mine count {mines} for {total} cells")]
    InvalidMineCount { mines: CellCount, total: CellCount },
    #[error("Mine position {0} listed more than once")]
    DuplicateMinePosition(Position),
    #[error("Board neighbor counts are already calculated")]
    BoardSealed,
    #[error("Board neighbor counts have not been calculated yet")]
    BoardNotSealed,
    #[error("Generated mine count mismatch, expected {expected} but placed {actual}")]
    MineCountMismatch { expected: CellCount, actual: CellCount },
    #[error("Game is not active")]
    NotActive,
    #[error(transparent)]
    Rule(#[from] RuleViolation),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Outcome of a single cell transition.
pub type RuleResult<T> = core::result::Result<T, RuleViolation>;
