#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded labyrinth generation driven by binary space partitioning.
//!
//! The system never touches tiles directly. It partitions the region, places
//! rooms, and routes corridors, expressing every edit as a [`Command`] that
//! the world executes. Feeding the emitted commands to a fresh world yields
//! the same labyrinth for the same configuration.

mod corridors;
mod partition;
mod rooms;

pub use corridors::{connect, connect_extra, route, Bend};
pub use partition::{CorridorEdge, Partition, PartitionId, PartitionTree, SplitAxis};
pub use rooms::{carve_room, RoomPlacement};

use labyrinth_core::{CellRect, Command, ConfigError, Event, GenerationConfig};
use labyrinth_world::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Counters describing what a generation run produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Partitions in the tree, root included.
    pub partitions: usize,
    /// Rooms carved.
    pub rooms: usize,
    /// Partitions left solid because no split position fit.
    pub abandoned_splits: usize,
    /// Rooms that kept their last candidate after every placement attempt failed.
    pub fallback_rooms: usize,
    /// Corridors joining sibling partitions.
    pub tree_corridors: usize,
    /// Corridors drawn between randomly paired partitions.
    pub extra_corridors: usize,
}

/// Partition tree and counters left behind by a generation run.
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    /// Partitions with their carved rooms.
    pub tree: PartitionTree,
    /// Summary counters.
    pub report: GenerationReport,
}

/// Finished labyrinth along with the data used to build it.
#[derive(Debug)]
pub struct Generated {
    /// World holding the completed labyrinth.
    pub world: World,
    /// Partition tree with carved rooms.
    pub tree: PartitionTree,
    /// Summary counters.
    pub report: GenerationReport,
}

/// One-shot generator bound to a validated configuration.
#[derive(Debug)]
pub struct Generation {
    config: GenerationConfig,
    rng: ChaCha8Rng,
}

impl Generation {
    /// Validates the configuration and seeds the random source.
    pub fn new(config: GenerationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self { config, rng })
    }

    /// Emits the full command sequence that builds the labyrinth.
    ///
    /// The sequence starts with [`Command::ConfigureLabyrinth`] and ends with
    /// [`Command::SealBoundary`] followed by [`Command::CompleteGeneration`].
    pub fn run(mut self, out: &mut Vec<Command>) -> GenerationOutcome {
        let GenerationConfig {
            width,
            height,
            min_room_width,
            min_room_height,
            max_depth,
            extra_corridor_chance,
            ..
        } = self.config;
        let rng = &mut self.rng;

        out.push(Command::ConfigureLabyrinth { width, height });

        let region = CellRect::from_bounds(0, width, 0, height);
        let mut tree =
            PartitionTree::build(region, max_depth, min_room_width, min_room_height, rng);
        let mut report = GenerationReport {
            partitions: tree.len(),
            abandoned_splits: tree.abandoned_splits(),
            ..GenerationReport::default()
        };

        let root = &tree[PartitionTree::ROOT];
        if root.is_leaf() && !root.is_abandoned() {
            let interior =
                CellRect::from_bounds(1, width.saturating_sub(1), 1, height.saturating_sub(1));
            tree.set_room(PartitionTree::ROOT, RoomPlacement::exact(interior));
            out.push(Command::CarveRoom { bounds: interior });
            report.rooms += 1;
        }

        let mut pool = Vec::new();
        while let Some(second) = tree.pop_pending() {
            let Some(first) = tree.pop_pending() else {
                break;
            };

            for id in [second, first] {
                if rng.gen_bool(extra_corridor_chance) {
                    pool.push(id);
                }
            }

            for id in [second, first] {
                let partition = &tree[id];
                if !partition.is_leaf() || partition.is_abandoned() {
                    continue;
                }
                let placement =
                    carve_room(partition, min_room_width, min_room_height, region, rng);
                tree.set_room(id, placement);
                out.push(Command::CarveRoom {
                    bounds: placement.bounds(),
                });
                report.rooms += 1;
                if placement.is_fallback() {
                    report.fallback_rooms += 1;
                }
            }

            if let Some(edge) = tree[second].corridor() {
                let both_leaves = tree[first].room().is_some() && tree[second].room().is_some();
                out.push(connect(&tree, edge, both_leaves));
                report.tree_corridors += 1;
            }
        }

        while pool.len() > 1 {
            let first = rng.gen_range(0..pool.len());
            let mut second = rng.gen_range(0..pool.len() - 1);
            if second >= first {
                second += 1;
            }
            let a = pool[first];
            let b = pool[second];
            let _ = pool.remove(first.max(second));
            let _ = pool.remove(first.min(second));

            let bend = if rng.gen_bool(0.5) {
                Bend::VerticalFirst
            } else {
                Bend::HorizontalFirst
            };
            out.push(connect_extra(&tree, a, b, bend));
            report.extra_corridors += 1;
        }

        out.push(Command::SealBoundary);
        out.push(Command::CompleteGeneration);

        debug!(
            partitions = report.partitions,
            rooms = report.rooms,
            abandoned_splits = report.abandoned_splits,
            fallback_rooms = report.fallback_rooms,
            tree_corridors = report.tree_corridors,
            extra_corridors = report.extra_corridors,
            "labyrinth plan emitted"
        );

        GenerationOutcome { tree, report }
    }
}

/// Generates a labyrinth into a fresh world.
pub fn generate(config: &GenerationConfig) -> Result<Generated, ConfigError> {
    let generation = Generation::new(config.clone())?;
    let mut commands = Vec::new();
    let GenerationOutcome { tree, report } = generation.run(&mut commands);

    let mut world = World::new();
    let mut events: Vec<Event> = Vec::new();
    for command in commands {
        labyrinth_world::apply(&mut world, command, &mut events);
    }

    Ok(Generated {
        world,
        tree,
        report,
    })
}

pub(crate) fn draw_between<R: Rng>(rng: &mut R, low: u32, high: u32) -> u32 {
    if low < high {
        rng.gen_range(low..high)
    } else {
        low
    }
}
