use core::borrow::Borrow;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

pub const CELL_ID_PREFIX: &str = "cell_";

/// Stable identifier of a cell, unique within one board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(String);

impl CellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Default scheme, `cell_{x}_{y}`.
    pub fn for_position(position: Position) -> Self {
        Self(format!("{CELL_ID_PREFIX}{}_{}", position.x(), position.y()))
    }

    pub fn is_valid(id: &str) -> bool {
        !id.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CellId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CellId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CellId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interaction state of a single cell.
///
/// `Hidden` is initial. `Revealed` and `Exploded` are reached by revealing, `Flagged`
/// toggles back to `Hidden`, and `Disabled` freezes the cell for good once the game ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    Disabled,
    Exploded,
}

/// What a successful [`Cell::reveal`] uncovered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellReveal {
    pub contains_mine: bool,
    pub neighbor_mine_count: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagAction {
    Flagged,
    Unflagged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    id: CellId,
    contains_mine: bool,
    position: Position,
    state: CellState,
    neighbor_mine_count: u8,
}

impl Cell {
    /// # Panics
    ///
    /// Panics if `id` is blank.
    pub fn new(id: CellId, position: Position) -> Self {
        assert!(
            CellId::is_valid(id.as_str()),
            "cell id must be a non-empty string"
        );
        Self {
            id,
            contains_mine: false,
            position,
            state: CellState::Hidden,
            neighbor_mine_count: 0,
        }
    }

    pub fn with_mine(id: CellId, position: Position) -> Self {
        Self {
            contains_mine: true,
            ..Self::new(id, position)
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn contains_mine(&self) -> bool {
        self.contains_mine
    }

    /// Only meaningful for cells without a mine, mine cells always report 0.
    pub fn neighbor_mine_count(&self) -> u8 {
        self.neighbor_mine_count
    }

    pub fn has_mined_neighbors(&self) -> bool {
        self.neighbor_mine_count > 0
    }

    pub fn is_hidden(&self) -> bool {
        self.state == CellState::Hidden
    }

    pub fn is_revealed(&self) -> bool {
        self.state == CellState::Revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.state == CellState::Flagged
    }

    pub fn is_disabled(&self) -> bool {
        self.state == CellState::Disabled
    }

    pub fn is_exploded(&self) -> bool {
        self.state == CellState::Exploded
    }

    pub fn can_be_revealed(&self) -> bool {
        self.is_hidden()
    }

    pub fn can_be_flagged(&self) -> bool {
        self.is_hidden() || self.is_flagged()
    }

    pub fn set_neighbor_mine_count(&mut self, count: u8) -> RuleResult<u8> {
        if self.contains_mine {
            return Err(RuleViolation::CountOnMine);
        }
        if count > 8 {
            return Err(RuleViolation::CountOutOfRange(count));
        }

        self.neighbor_mine_count = count;
        Ok(count)
    }

    pub fn set_as_mine(&mut self) -> RuleResult<()> {
        if self.contains_mine {
            return Err(RuleViolation::AlreadyMined);
        }

        self.contains_mine = true;
        self.neighbor_mine_count = 0;
        Ok(())
    }

    pub fn reveal(&mut self) -> RuleResult<CellReveal> {
        match self.state {
            CellState::Disabled => Err(RuleViolation::RevealDisabled),
            CellState::Revealed | CellState::Exploded => Err(RuleViolation::AlreadyRevealed),
            CellState::Flagged => Err(RuleViolation::RevealFlagged),
            CellState::Hidden => {
                self.state = CellState::Revealed;
                Ok(CellReveal {
                    contains_mine: self.contains_mine,
                    neighbor_mine_count: self.neighbor_mine_count,
                })
            }
        }
    }

    pub fn toggle_flag(&mut self) -> RuleResult<FlagAction> {
        match self.state {
            CellState::Disabled => Err(RuleViolation::FlagDisabled),
            CellState::Revealed | CellState::Exploded => Err(RuleViolation::FlagRevealed),
            CellState::Flagged => {
                self.state = CellState::Hidden;
                Ok(FlagAction::Unflagged)
            }
            CellState::Hidden => {
                self.state = CellState::Flagged;
                Ok(FlagAction::Flagged)
            }
        }
    }

    /// Freezes the cell, calling it again is a no-op. An exploded mine stays exploded.
    pub fn disable(&mut self) {
        if !self.is_exploded() {
            self.state = CellState::Disabled;
        }
    }

    pub fn explode(&mut self) -> RuleResult<()> {
        if !self.contains_mine {
            return Err(RuleViolation::NotAMine);
        }
        if self.is_disabled() {
            return Err(RuleViolation::ExplodeDisabled);
        }

        self.state = CellState::Exploded;
        Ok(())
    }

    /// Two cells are the same cell when their ids match, regardless of state.
    pub fn same_identity(&self, other: &Cell) -> bool {
        self.id == other.id
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            id: self.id.clone(),
            position: self.position,
            contains_mine: self.contains_mine,
            state: self.state,
            neighbor_mine_count: self.neighbor_mine_count,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cell({}, mine: {}, state: {:?})",
            self.id, self.contains_mine, self.state
        )
    }
}

/// Owned, read-only copy of a cell handed to collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub id: CellId,
    pub position: Position,
    pub contains_mine: bool,
    pub state: CellState,
    pub neighbor_mine_count: u8,
}

impl CellSnapshot {
    pub fn is_hidden(&self) -> bool {
        self.state == CellState::Hidden
    }

    pub fn is_revealed(&self) -> bool {
        self.state == CellState::Revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.state == CellState::Flagged
    }

    pub fn is_disabled(&self) -> bool {
        self.state == CellState::Disabled
    }

    pub fn is_exploded(&self) -> bool {
        self.state == CellState::Exploded
    }

    /// Picks the visual representation, `wrong_flag` comes from the post-loss wrong flag lookup.
    pub fn view(&self, wrong_flag: bool) -> CellView {
        if wrong_flag {
            return CellView::WrongFlag;
        }

        match (self.state, self.contains_mine) {
            (CellState::Hidden, _) => CellView::Hidden,
            (CellState::Flagged, _) => CellView::Flagged,
            (CellState::Exploded, _) => CellView::Exploded,
            (CellState::Revealed, true) => CellView::Mine,
            (CellState::Revealed, false) if self.neighbor_mine_count == 0 => CellView::Empty,
            (CellState::Revealed, false) => CellView::Number(self.neighbor_mine_count),
            (CellState::Disabled, contains_mine) => CellView::Disabled {
                contains_mine,
                neighbor_mine_count: self.neighbor_mine_count,
            },
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        cell.snapshot()
    }
}

/// Closed set of ways a cell can look, for renderers to match on exhaustively.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    WrongFlag,
    Empty,
    Number(u8),
    Mine,
    Exploded,
    Disabled {
        contains_mine: bool,
        neighbor_mine_count: u8,
    },
}
