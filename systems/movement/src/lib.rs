#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-gated agents that roam a finished labyrinth.
//!
//! Every agent owns a step interval and an accumulated-time counter. Each call
//! to [`Movement::handle`] adds the elapsed time to every counter; an agent
//! acts once its counter strictly exceeds its interval and then moves at most
//! one cell according to its [`MovementPolicy`].

mod selectors;

pub use selectors::{ChaseTarget, GoalContext, GoalSelector, PowerupTour};

use std::{collections::HashSet, fmt, time::Duration};

use labyrinth_core::{CellCoord, CostTable, Direction, LabyrinthView};
use labyrinth_system_pathfinding::Pathfinder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Identifier assigned to agents in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Closed set of behaviours an agent can follow.
#[derive(Debug)]
pub enum MovementPolicy {
    /// Steps toward the target along both axes at once, diagonals included.
    DirectChase,
    /// Wanders randomly, preferring neighbours it has not picked before.
    RandomWalk,
    /// Follows the shared pathfinder toward the selector's current goal.
    PathfindToGoal(Box<dyn GoalSelector>),
}

impl MovementPolicy {
    /// Short label used in logs and reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DirectChase => "direct-chase",
            Self::RandomWalk => "random-walk",
            Self::PathfindToGoal(_) => "pathfind",
        }
    }
}

/// Agent roaming the labyrinth.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    cell: CellCoord,
    policy: MovementPolicy,
    interval: Duration,
    accumulator: Duration,
    remembered: HashSet<CellCoord>,
}

impl Agent {
    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Cell the agent currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Policy driving the agent.
    #[must_use]
    pub const fn policy(&self) -> &MovementPolicy {
        &self.policy
    }

    /// Time that must strictly elapse between two actions.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated since the last reset.
    #[must_use]
    pub const fn accumulator(&self) -> Duration {
        self.accumulator
    }
}

/// Single-cell move performed during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentStep {
    /// Agent that moved.
    pub agent: AgentId,
    /// Cell the agent left.
    pub from: CellCoord,
    /// Cell the agent entered.
    pub to: CellCoord,
}

/// Configuration parameters required to construct the movement system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    costs: CostTable,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cost table and seed.
    #[must_use]
    pub const fn new(costs: CostTable, rng_seed: u64) -> Self {
        Self { costs, rng_seed }
    }
}

/// System that owns every agent and advances them once per tick.
#[derive(Debug)]
pub struct Movement {
    agents: Vec<Agent>,
    next_id: u32,
    pathfinder: Pathfinder,
    costs: CostTable,
    rng: ChaCha8Rng,
}

impl Movement {
    /// Creates a movement system without agents.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            agents: Vec::new(),
            next_id: 0,
            pathfinder: Pathfinder::new(),
            costs: config.costs,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Places a new agent on `cell`.
    pub fn spawn(
        &mut self,
        cell: CellCoord,
        policy: MovementPolicy,
        interval: Duration,
    ) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        trace!(%id, ?cell, policy = policy.label(), "agent spawned");
        self.agents.push(Agent {
            id,
            cell,
            policy,
            interval,
            accumulator: Duration::ZERO,
            remembered: HashSet::new(),
        });
        id
    }

    /// Moves an agent to `cell` immediately, clearing its accumulated time.
    ///
    /// Returns `false` when no agent carries the identifier.
    pub fn relocate(&mut self, id: AgentId, cell: CellCoord) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|agent| agent.id == id) else {
            return false;
        };
        agent.cell = cell;
        agent.accumulator = Duration::ZERO;
        agent.remembered.clear();
        true
    }

    /// Agent carrying the identifier, if any.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Every agent in spawn order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Identifiers of agents standing on `cell`.
    #[must_use]
    pub fn agents_at(&self, cell: CellCoord) -> Vec<AgentId> {
        self.agents
            .iter()
            .filter(|agent| agent.cell == cell)
            .map(|agent| agent.id)
            .collect()
    }

    /// Advances every agent by `dt`, appending the moves made to `out`.
    pub fn handle(
        &mut self,
        dt: Duration,
        view: &LabyrinthView<'_>,
        context: &GoalContext<'_>,
        out: &mut Vec<AgentStep>,
    ) {
        for agent in &mut self.agents {
            agent.accumulator = agent.accumulator.saturating_add(dt);
            if agent.accumulator <= agent.interval {
                continue;
            }

            let id = agent.id;
            let from = agent.cell;
            let (destination, always_reset) = match &mut agent.policy {
                MovementPolicy::DirectChase => (
                    context.target.and_then(|target| chase_step(from, target)),
                    false,
                ),
                MovementPolicy::RandomWalk => (
                    wander_step(from, &mut agent.remembered, &mut self.rng),
                    false,
                ),
                MovementPolicy::PathfindToGoal(selector) => {
                    let goal = selector.goal(from, context, &mut self.rng);
                    let step = goal.and_then(|goal| {
                        match self.pathfinder.find_path_in(view, from, goal, &self.costs) {
                            Ok(outcome) => outcome.first_step(),
                            Err(error) => {
                                trace!(%id, %error, "path query rejected");
                                None
                            }
                        }
                    });
                    (step, true)
                }
            };

            let moved = try_move(agent, destination, view);
            if moved || always_reset {
                agent.accumulator = Duration::ZERO;
            }

            if moved {
                out.push(AgentStep {
                    agent: id,
                    from,
                    to: agent.cell,
                });
            }
        }
    }
}

fn try_move(agent: &mut Agent, destination: Option<CellCoord>, view: &LabyrinthView<'_>) -> bool {
    match destination {
        Some(cell) if cell != agent.cell && view.is_walkable(cell) => {
            agent.cell = cell;
            true
        }
        _ => false,
    }
}

fn chase_step(from: CellCoord, target: CellCoord) -> Option<CellCoord> {
    let dx = axis_sign(from.x(), target.x());
    let dy = axis_sign(from.y(), target.y());
    from.offset(dx, dy)
}

fn axis_sign(from: u32, to: u32) -> i32 {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
    }
}

fn wander_step<R: Rng>(
    from: CellCoord,
    remembered: &mut HashSet<CellCoord>,
    rng: &mut R,
) -> Option<CellCoord> {
    let neighbours: Vec<CellCoord> = Direction::ALL
        .iter()
        .filter_map(|direction| from.step(*direction))
        .collect();
    if neighbours.iter().all(|cell| remembered.contains(cell)) {
        remembered.clear();
    }

    let fresh: Vec<CellCoord> = neighbours
        .into_iter()
        .filter(|cell| !remembered.contains(cell))
        .collect();
    if fresh.is_empty() {
        return None;
    }
    let choice = fresh[rng.gen_range(0..fresh.len())];
    let _ = remembered.insert(choice);
    Some(choice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_step_moves_diagonally_toward_the_target() {
        assert_eq!(
            chase_step(CellCoord::new(2, 2), CellCoord::new(5, 0)),
            Some(CellCoord::new(3, 1))
        );
        assert_eq!(
            chase_step(CellCoord::new(2, 2), CellCoord::new(2, 7)),
            Some(CellCoord::new(2, 3))
        );
        assert_eq!(
            chase_step(CellCoord::new(2, 2), CellCoord::new(2, 2)),
            Some(CellCoord::new(2, 2))
        );
    }

    #[test]
    fn wander_step_avoids_remembered_neighbours() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let from = CellCoord::new(5, 5);
        let mut remembered: HashSet<CellCoord> = [
            CellCoord::new(4, 5),
            CellCoord::new(6, 5),
            CellCoord::new(5, 4),
        ]
        .into_iter()
        .collect();

        let choice = wander_step(from, &mut remembered, &mut rng);

        assert_eq!(choice, Some(CellCoord::new(5, 6)));
        assert_eq!(remembered.len(), 4);
    }

    #[test]
    fn wander_step_forgets_once_every_neighbour_was_picked() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let from = CellCoord::new(5, 5);
        let mut remembered: HashSet<CellCoord> = Direction::ALL
            .iter()
            .filter_map(|direction| from.step(*direction))
            .chain([CellCoord::new(0, 0)])
            .collect();

        let choice = wander_step(from, &mut remembered, &mut rng).expect("memory was cleared");

        assert_eq!(remembered.len(), 1);
        assert!(remembered.contains(&choice));
    }

    #[test]
    fn agent_ids_display_with_prefix() {
        assert_eq!(AgentId::new(3).to_string(), "agent-3");
        assert_eq!(AgentId::new(3).get(), 3);
    }
}
