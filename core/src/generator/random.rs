use hashbrown::HashSet;
use rand::prelude::*;
use web_time::SystemTime;

use super::*;

/// Uniform placement by sampling random positions and retrying on collision.
#[derive(Clone, Debug)]
pub struct RandomMinefieldGenerator {
    rng: SmallRng,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeds from the wall clock, for games that should differ every time.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos() as u64);
        log::debug!("Seeding minefield generator with {}", seed);
        Self::new(seed)
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn mine_positions(&mut self, config: &GameConfig) -> Vec<Position> {
        let bounds = config.bounds();
        let total_cells = bounds.total_cells();

        // leave one safe cell so sampling terminates
        let mines = if config.mines_count() >= total_cells {
            log::warn!(
                "Minefield would be full, requested {} but only fits {}",
                config.mines_count(),
                total_cells - 1
            );
            total_cells - 1
        } else {
            config.mines_count()
        };

        let mut chosen = HashSet::with_capacity(mines.into());
        let mut positions = Vec::with_capacity(mines.into());
        let mut collisions = 0_usize;
        while positions.len() < usize::from(mines) {
            let position = Position::new(
                self.rng.random_range(0..bounds.rows()),
                self.rng.random_range(0..bounds.cols()),
            );
            if chosen.insert(position) {
                positions.push(position);
            } else {
                collisions += 1;
            }
        }

        log::trace!(
            "Sampled {} mine positions with {} collisions",
            positions.len(),
            collisions
        );
        positions
    }
}
