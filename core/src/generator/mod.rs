use crate::*;
pub use random::*;

mod random;

/// Chooses where the mines of a new board go.
pub trait MinefieldGenerator {
    /// Distinct, in-bounds positions, exactly `config.mines_count()` of them.
    fn mine_positions(&mut self, config: &GameConfig) -> Vec<Position>;
}

/// Always hands out the same layout, for scripted games and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMinefieldGenerator {
    positions: Vec<Position>,
}

impl FixedMinefieldGenerator {
    pub fn new<P: Into<Position>>(positions: impl IntoIterator<Item = P>) -> Self {
        Self {
            positions: positions.into_iter().map(Into::into).collect(),
        }
    }
}

impl MinefieldGenerator for FixedMinefieldGenerator {
    fn mine_positions(&mut self, config: &GameConfig) -> Vec<Position> {
        if self.positions.len() != usize::from(config.mines_count()) {
            log::warn!(
                "Fixed layout has {} mines but the configuration asks for {}",
                self.positions.len(),
                config.mines_count()
            );
        }
        self.positions.clone()
    }
}
