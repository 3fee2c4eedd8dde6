use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use interaction::*;
pub use neighbor::*;
pub use rules::*;
pub use service::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod events;
mod generator;
mod interaction;
mod neighbor;
mod rules;
mod service;
mod types;

pub const MIN_BOARD_SIZE: Coord = 5;
pub const MAX_BOARD_SIZE: Coord = 100;
pub const DEFAULT_MINES_PERCENTAGE: f64 = 15.0;

/// Validated board dimensions and mine density.
///
/// Deserializing goes through the same checks as [`GameConfig::new`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig", into = "RawGameConfig")]
pub struct GameConfig {
    rows: Coord,
    cols: Coord,
    mines_percentage: f64,
    mines_count: CellCount,
}

impl GameConfig {
    pub fn new(rows: Coord, cols: Coord, mines_percentage: f64) -> Result<Self> {
        if !(mines_percentage.is_finite() && mines_percentage > 0.0) {
            return Err(GameError::InvalidMinePercentage);
        }

        let config = Self::from_parts(rows, cols, mines_percentage);
        GameRules.validate_configuration(rows, cols, config.mines_count)?;
        Ok(config)
    }

    pub fn beginner() -> Self {
        Self::from_parts(8, 8, DEFAULT_MINES_PERCENTAGE)
    }

    pub fn intermediate() -> Self {
        Self::from_parts(16, 16, DEFAULT_MINES_PERCENTAGE)
    }

    pub fn expert() -> Self {
        Self::from_parts(16, 30, DEFAULT_MINES_PERCENTAGE)
    }

    fn from_parts(rows: Coord, cols: Coord, mines_percentage: f64) -> Self {
        let total = mult(rows, cols);
        let mines = (f64::from(total) * mines_percentage / 100.0).round();
        Self {
            rows,
            cols,
            mines_percentage,
            // float to int casts saturate
            mines_count: mines as CellCount,
        }
    }

    pub fn rows(&self) -> Coord {
        self.rows
    }

    pub fn cols(&self) -> Coord {
        self.cols
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.rows, self.cols)
    }

    pub fn mines_percentage(&self) -> f64 {
        self.mines_percentage
    }

    pub fn total_count(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    pub fn mines_count(&self) -> CellCount {
        self.mines_count
    }

    pub fn empty_count(&self) -> CellCount {
        self.total_count() - self.mines_count
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::beginner()
    }
}

fn default_mines_percentage() -> f64 {
    DEFAULT_MINES_PERCENTAGE
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
struct RawGameConfig {
    rows: Coord,
    cols: Coord,
    #[serde(default = "default_mines_percentage")]
    mines_percentage: f64,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        Self::new(raw.rows, raw.cols, raw.mines_percentage)
    }
}

impl From<GameConfig> for RawGameConfig {
    fn from(config: GameConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            mines_percentage: config.mines_percentage,
        }
    }
}
