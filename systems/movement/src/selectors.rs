//! Goal selection strategies for pathfinding agents.

use std::fmt::Debug;

use labyrinth_core::CellCoord;
use rand::{Rng, RngCore};

/// Live state an agent may steer toward.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoalContext<'a> {
    /// Cell occupied by the pursued target, if one is present.
    pub target: Option<CellCoord>,
    /// Cells currently holding a power-up.
    pub powerups: &'a [CellCoord],
}

/// Supplies the goal a pathfinding agent should head for on this tick.
pub trait GoalSelector: Debug {
    /// Goal for an agent standing on `position`, or `None` to stay put.
    fn goal(
        &mut self,
        position: CellCoord,
        context: &GoalContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<CellCoord>;
}

/// Heads straight for the live target cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChaseTarget;

impl GoalSelector for ChaseTarget {
    fn goal(
        &mut self,
        _position: CellCoord,
        context: &GoalContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> Option<CellCoord> {
        context.target
    }
}

/// Wanders between power-ups, choosing a new one at random on arrival.
#[derive(Clone, Copy, Debug, Default)]
pub struct PowerupTour {
    current: Option<CellCoord>,
}

impl PowerupTour {
    /// Power-up the agent is currently heading for.
    #[must_use]
    pub const fn current(&self) -> Option<CellCoord> {
        self.current
    }
}

impl GoalSelector for PowerupTour {
    fn goal(
        &mut self,
        position: CellCoord,
        context: &GoalContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<CellCoord> {
        let still_valid = self
            .current
            .filter(|cell| *cell != position && context.powerups.contains(cell));
        if still_valid.is_some() {
            return still_valid;
        }

        let candidates: Vec<CellCoord> = context
            .powerups
            .iter()
            .copied()
            .filter(|cell| *cell != position)
            .collect();
        self.current = if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        };
        self.current
    }
}
