use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::*;

/// Why a cell became visible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealKind {
    /// A mine revealed by the player, the losing move.
    Explosion,
    /// A safe cell with no mined neighbors, it opens its own neighbors.
    Cascade,
    /// A safe cell with at least one mined neighbor.
    Single,
    /// A mine uncovered by the end-of-game sweep.
    MineReveal,
    /// A flag found on a safe cell after a loss.
    WrongFlag,
}

/// One cell opened by a cascade, in the order it was opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CascadeEntry {
    pub cell: CellSnapshot,
    pub kind: RevealKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RevealOutcome {
    Explosion {
        cell: CellSnapshot,
    },
    Single {
        cell: CellSnapshot,
    },
    Cascade {
        cell: CellSnapshot,
        revealed: Vec<CascadeEntry>,
    },
}

impl RevealOutcome {
    pub fn kind(&self) -> RevealKind {
        match self {
            Self::Explosion { .. } => RevealKind::Explosion,
            Self::Single { .. } => RevealKind::Single,
            Self::Cascade { .. } => RevealKind::Cascade,
        }
    }

    /// The cell the player asked to reveal.
    pub fn cell(&self) -> &CellSnapshot {
        match self {
            Self::Explosion { cell } | Self::Single { cell } | Self::Cascade { cell, .. } => cell,
        }
    }

    pub fn position(&self) -> Position {
        self.cell().position
    }

    /// Cells opened by the cascade, not including the origin cell.
    pub fn cascade(&self) -> &[CascadeEntry] {
        match self {
            Self::Cascade { revealed, .. } => revealed,
            Self::Explosion { .. } | Self::Single { .. } => &[],
        }
    }

    pub fn is_explosion(&self) -> bool {
        matches!(self, Self::Explosion { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlagOutcome {
    pub cell: CellSnapshot,
    pub action: FlagAction,
}

/// Turns reveal and flag requests into cell transitions on a board.
#[derive(Copy, Clone, Debug, Default)]
pub struct CellInteractionService {
    rules: GameRules,
}

impl CellInteractionService {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> GameRules {
        self.rules
    }

    pub fn reveal_cell(&self, board: &mut Board, position: Position) -> Result<RevealOutcome> {
        if !board.is_sealed() {
            return Err(GameError::BoardNotSealed);
        }

        let cell = board.cell_at_mut(position)?;
        if !self.rules.can_reveal_cell(cell) {
            return Err(RuleViolation::NotRevealable.into());
        }

        let reveal = cell.reveal()?;
        if reveal.contains_mine {
            cell.explode()?;
            log::debug!("Mine exploded at {}", position);
            return Ok(RevealOutcome::Explosion {
                cell: cell.snapshot(),
            });
        }

        let cell = cell.snapshot();
        log::debug!(
            "Revealed cell at {}, mine count: {}",
            position,
            reveal.neighbor_mine_count
        );
        if reveal.neighbor_mine_count > 0 {
            return Ok(RevealOutcome::Single { cell });
        }

        let revealed = self.cascade_from(board, position);
        Ok(RevealOutcome::Cascade { cell, revealed })
    }

    /// Breadth-first flood fill from an already revealed zero cell.
    fn cascade_from(&self, board: &mut Board, origin: Position) -> Vec<CascadeEntry> {
        let mut queued = HashSet::new();
        queued.insert(origin);
        let mut to_visit = VecDeque::new();
        self.enqueue_neighbors(board, origin, &mut queued, &mut to_visit);
        log::trace!(
            "Starting cascade from {}, initial neighbors: {:?}",
            origin,
            to_visit
        );

        let mut revealed = Vec::new();
        while let Some(position) = to_visit.pop_front() {
            let Ok(cell) = board.cell_at_mut(position) else {
                continue;
            };
            if !self.rules.can_reveal_cell(cell) {
                log::trace!("Skipping cell at {}", position);
                continue;
            }
            let Ok(reveal) = cell.reveal() else {
                continue;
            };

            let kind = if reveal.neighbor_mine_count == 0 {
                RevealKind::Cascade
            } else {
                RevealKind::Single
            };
            revealed.push(CascadeEntry {
                cell: cell.snapshot(),
                kind,
            });
            log::trace!(
                "Cascade opened cell at {}, mine count: {}",
                position,
                reveal.neighbor_mine_count
            );

            if kind == RevealKind::Cascade {
                self.enqueue_neighbors(board, position, &mut queued, &mut to_visit);
            }
        }

        revealed
    }

    fn enqueue_neighbors(
        &self,
        board: &Board,
        position: Position,
        queued: &mut HashSet<Position>,
        to_visit: &mut VecDeque<Position>,
    ) {
        for neighbor in position.neighbors(board.bounds()) {
            let cell = &board[neighbor];
            if self.rules.can_reveal_cell(cell) && !cell.contains_mine() && queued.insert(neighbor) {
                to_visit.push_back(neighbor);
            }
        }
    }

    pub fn toggle_cell_flag(&self, board: &mut Board, position: Position) -> Result<FlagOutcome> {
        let cell = board.cell_at_mut(position)?;
        if !self.rules.can_flag_cell(cell) {
            return Err(RuleViolation::NotFlaggable.into());
        }

        let action = cell.toggle_flag()?;
        log::debug!("Cell at {} {:?}", position, action);
        Ok(FlagOutcome {
            cell: cell.snapshot(),
            action,
        })
    }

    /// End-of-game sweep uncovering every mine.
    ///
    /// Hidden and flagged mines are revealed, a flag is lifted first. Mines that are already
    /// revealed or exploded are left alone but still reported, disabled ones are skipped.
    pub fn reveal_all_mines(&self, board: &mut Board) -> Vec<CellSnapshot> {
        board
            .cells_mut()
            .filter(|cell| cell.contains_mine())
            .filter_map(|cell| {
                match cell.state() {
                    CellState::Hidden => {
                        cell.reveal().ok()?;
                    }
                    CellState::Flagged => {
                        cell.toggle_flag().ok()?;
                        cell.reveal().ok()?;
                    }
                    CellState::Revealed | CellState::Exploded => {}
                    CellState::Disabled => return None,
                }
                Some(cell.snapshot())
            })
            .collect()
    }

    /// Flagged cells without a mine.
    pub fn find_wrong_flags(&self, board: &Board) -> Vec<CellSnapshot> {
        board
            .cells()
            .filter(|cell| cell.is_flagged() && !cell.contains_mine())
            .map(Cell::snapshot)
            .collect()
    }

    /// Freezes every cell except an exploded mine, returns how many cells are now disabled.
    pub fn disable_all_cells(&self, board: &mut Board) -> CellCount {
        for cell in board.cells_mut() {
            cell.disable();
        }
        board.count_cells(Cell::is_disabled)
    }
}
