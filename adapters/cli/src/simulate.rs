//! Fixed-rate pursuit simulation over a generated labyrinth.

use std::time::Duration;

use anyhow::{Context, Result};
use labyrinth_core::{CellCoord, LabyrinthView};
use labyrinth_system_generation::Generated;
use labyrinth_system_movement::{
    Agent, AgentId, ChaseTarget, Config as MovementConfig, GoalContext, Movement, MovementPolicy,
    PowerupTour,
};
use labyrinth_system_spawning::{Config as SpawningConfig, Spawning};
use labyrinth_world::{query, ReachabilityField};
use tracing::{debug, info};

use crate::{
    config::CliConfig,
    render::{render, Markers},
};

/// Pursuer that reached the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Capture {
    pub(crate) tick: u32,
    pub(crate) agent: AgentId,
    pub(crate) policy: &'static str,
    pub(crate) cell: CellCoord,
}

/// Summary of a finished simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SimulationReport {
    pub(crate) ticks: u32,
    pub(crate) capture: Option<Capture>,
    pub(crate) powerups_collected: usize,
    pub(crate) pursuers_repelled: usize,
    pub(crate) target: CellCoord,
    pub(crate) final_frame: String,
}

pub(crate) struct Simulation<'a> {
    view: LabyrinthView<'a>,
    spawning: Spawning,
    pursuers: Movement,
    wanderer: Movement,
    target: AgentId,
    reachable: ReachabilityField,
    invulnerability: Duration,
}

impl<'a> Simulation<'a> {
    /// Places power-ups, the target, and one pursuer per policy.
    ///
    /// Pursuers only start on cells the target can be reached from.
    pub(crate) fn new(generated: &'a Generated, config: &CliConfig) -> Result<Self> {
        let view = query::labyrinth_view(&generated.world)
            .context("labyrinth generation did not complete")?;

        let spawning_config =
            SpawningConfig::new(config.spawning.powerup_chance, config.spawning.seed)?;
        let mut spawning = Spawning::new(spawning_config);
        let placed = spawning.place_powerups(&view);

        let mut wanderer = Movement::new(MovementConfig::new(config.costs, config.agents.seed));
        let target_cell = spawning
            .find_start_position(&view, None, |_| true)
            .context("no walkable cell for the target")?;
        let target = wanderer.spawn(
            target_cell,
            MovementPolicy::RandomWalk,
            config.agents.target_interval(),
        );
        let reachable = query::reachability(&generated.world, target_cell)
            .context("labyrinth generation did not complete")?;

        let mut pursuers = Movement::new(MovementConfig::new(
            config.costs,
            config.agents.seed.wrapping_add(1),
        ));
        let policies = [
            MovementPolicy::DirectChase,
            MovementPolicy::RandomWalk,
            MovementPolicy::PathfindToGoal(Box::new(ChaseTarget)),
            MovementPolicy::PathfindToGoal(Box::new(PowerupTour::default())),
        ];
        for policy in policies {
            let label = policy.label();
            let cell = spawning
                .find_start_position(&view, Some(target_cell), |cell| {
                    reachable.is_reachable(cell) && pursuers.agents_at(cell).is_empty()
                })
                .with_context(|| format!("no start position for the {label} pursuer"))?;
            let _ = pursuers.spawn(cell, policy, config.agents.step_interval());
        }

        info!(
            walkable = view.walkable().len(),
            connected = reachable.reached(),
            powerups = placed,
            pursuers = pursuers.agents().len(),
            "simulation ready"
        );

        Ok(Self {
            view,
            spawning,
            pursuers,
            wanderer,
            target,
            reachable,
            invulnerability: config.spawning.invulnerability(),
        })
    }

    fn target_cell(&self) -> Result<CellCoord> {
        self.wanderer
            .agent(self.target)
            .map(Agent::cell)
            .context("target agent disappeared")
    }

    /// Sends every pursuer standing on `target` back to a fresh start cell.
    fn repel(&mut self, target: CellCoord, tick: u32) -> usize {
        let mut repelled = 0;
        for id in self.pursuers.agents_at(target) {
            let pursuers = &self.pursuers;
            let reachable = &self.reachable;
            let Some(cell) = self.spawning.find_start_position(&self.view, Some(target), |cell| {
                reachable.is_reachable(cell) && pursuers.agents_at(cell).is_empty()
            }) else {
                continue;
            };
            if self.pursuers.relocate(id, cell) {
                debug!(tick, agent = %id, to = ?cell, "invulnerable target repelled a pursuer");
                repelled += 1;
            }
        }
        repelled
    }

    /// Advances the simulation by `tick` up to `ticks` times or until a capture.
    ///
    /// Collecting a power-up makes the target invulnerable for the configured
    /// duration. While that lasts, pursuers that reach the target are sent
    /// back to a fresh start cell instead of catching it.
    pub(crate) fn run(mut self, ticks: u32, tick: Duration) -> Result<SimulationReport> {
        let mut steps = Vec::new();
        let mut collected = 0;
        let mut repelled = 0;
        let mut invulnerable = Duration::ZERO;
        let mut capture = None;
        let mut elapsed = 0;

        for index in 1..=ticks {
            elapsed = index;
            steps.clear();
            self.wanderer
                .handle(tick, &self.view, &GoalContext::default(), &mut steps);
            let target = self.target_cell()?;
            if let Some(pickup) = self.spawning.collect(target, &self.view) {
                collected += 1;
                invulnerable = self.invulnerability;
                debug!(
                    tick = index,
                    cell = ?pickup.cell,
                    replacement = ?pickup.replacement,
                    "target collected a power-up"
                );
            }
            invulnerable = invulnerable.saturating_sub(tick);

            let context = GoalContext {
                target: Some(target),
                powerups: self.spawning.powerups(),
            };
            self.pursuers.handle(tick, &self.view, &context, &mut steps);

            if !invulnerable.is_zero() {
                repelled += self.repel(target, index);
                continue;
            }
            if let Some(agent) = self
                .pursuers
                .agents()
                .iter()
                .find(|agent| agent.cell() == target)
            {
                capture = Some(Capture {
                    tick: index,
                    agent: agent.id(),
                    policy: agent.policy().label(),
                    cell: target,
                });
                break;
            }
        }

        if let Some(capture) = &capture {
            info!(
                tick = capture.tick,
                agent = %capture.agent,
                policy = capture.policy,
                "target caught"
            );
        } else {
            info!(ticks = elapsed, repelled, "target evaded every pursuer");
        }

        let target = self.target_cell()?;
        let agents: Vec<CellCoord> = self.pursuers.agents().iter().map(Agent::cell).collect();
        let final_frame = render(
            &self.view,
            &Markers {
                target: Some(target),
                agents: &agents,
                powerups: self.spawning.powerups(),
            },
        );

        Ok(SimulationReport {
            ticks: elapsed,
            capture,
            powerups_collected: collected,
            pursuers_repelled: repelled,
            target,
            final_frame,
        })
    }
}
