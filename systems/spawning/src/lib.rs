#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic placement of power-ups and agent start positions.

use labyrinth_core::{ensure_probability, CellCoord, ConfigError, LabyrinthView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const START_POSITION_ATTEMPTS: u32 = 50;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    powerup_chance: f64,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided placement chance and seed.
    pub fn new(powerup_chance: f64, rng_seed: u64) -> Result<Self, ConfigError> {
        ensure_probability("powerup_chance", powerup_chance)?;
        Ok(Self {
            powerup_chance,
            rng_seed,
        })
    }
}

/// Power-up removed from the labyrinth by a collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collected {
    /// Cell the power-up was taken from.
    pub cell: CellCoord,
    /// Cell that received a replacement power-up, if any draw succeeded.
    pub replacement: Option<CellCoord>,
}

/// Seeded system that owns the power-up layout.
#[derive(Debug)]
pub struct Spawning {
    powerup_chance: f64,
    powerups: Vec<CellCoord>,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a spawning system without any power-ups placed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            powerup_chance: config.powerup_chance,
            powerups: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Scatters power-ups over the walkable cells in row-major order.
    ///
    /// Each cell is drawn independently. Any previous layout is discarded.
    /// Returns the number of power-ups placed.
    pub fn place_powerups(&mut self, view: &LabyrinthView<'_>) -> usize {
        self.powerups.clear();
        for cell in view.walkable().iter() {
            if self.rng.gen_bool(self.powerup_chance) {
                self.powerups.push(cell);
            }
        }
        debug!(placed = self.powerups.len(), "power-ups placed");
        self.powerups.len()
    }

    /// Removes the power-up at `cell` and places one replacement.
    ///
    /// The replacement lands on the first walkable cell without a power-up,
    /// scanning row-major, whose chance draw succeeds. Returns `None` when
    /// no power-up occupies `cell`.
    pub fn collect(&mut self, cell: CellCoord, view: &LabyrinthView<'_>) -> Option<Collected> {
        let index = self.powerups.iter().position(|powerup| *powerup == cell)?;
        let _ = self.powerups.remove(index);

        let mut replacement = None;
        for candidate in view.walkable().iter() {
            if self.rng.gen_bool(self.powerup_chance) && !self.powerups.contains(&candidate) {
                self.powerups.push(candidate);
                replacement = Some(candidate);
                break;
            }
        }
        debug!(?cell, ?replacement, "power-up collected");
        Some(Collected { cell, replacement })
    }

    /// Cells currently holding a power-up.
    #[must_use]
    pub fn powerups(&self) -> &[CellCoord] {
        &self.powerups
    }

    /// Reports whether a power-up occupies `cell`.
    #[must_use]
    pub fn has_powerup(&self, cell: CellCoord) -> bool {
        self.powerups.contains(&cell)
    }

    /// Draws a random walkable cell for an agent to start on.
    ///
    /// Candidates equal to `avoid` or rejected by `accept` are redrawn. Gives
    /// up and returns `None` once the attempt budget is spent.
    pub fn find_start_position<F>(
        &mut self,
        view: &LabyrinthView<'_>,
        avoid: Option<CellCoord>,
        accept: F,
    ) -> Option<CellCoord>
    where
        F: Fn(CellCoord) -> bool,
    {
        let (width, height) = view.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        for _ in 0..START_POSITION_ATTEMPTS {
            let cell = CellCoord::new(self.rng.gen_range(0..width), self.rng.gen_range(0..height));
            if view.is_walkable(cell) && Some(cell) != avoid && accept(cell) {
                return Some(cell);
            }
        }
        debug!(?avoid, "no start position found");
        None
    }
}
