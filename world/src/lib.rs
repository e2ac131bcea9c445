#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative labyrinth state.
//!
//! The world owns the tile classification and the walkable set. Generation
//! systems never write to it directly: they submit [`Command`] values through
//! [`apply`], which enforces the classification rules (corridors never
//! overwrite rooms, the outer ring is always wall) and freezes the labyrinth
//! once generation completes.

mod reachability;

pub use reachability::ReachabilityField;

use labyrinth_core::{
    CarvingError, CellCoord, CellRect, Command, Corner, Event, Side, Tile, WalkableSet,
};
use tracing::{debug, warn};

/// Represents the authoritative labyrinth state.
#[derive(Debug, Default)]
pub struct World {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    walkable: WalkableSet,
    rooms: Vec<CellRect>,
    corridors: usize,
    complete: bool,
}

impl World {
    /// Creates an unconfigured world with no cells.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn configure(&mut self, width: u32, height: u32) {
        let count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        self.width = width;
        self.height = height;
        self.tiles = vec![Tile::Wall; count];
        self.walkable = WalkableSet::new(width, height);
        self.rooms.clear();
        self.corridors = 0;
        self.complete = false;
    }

    fn ensure_carvable(&self) -> Result<(), CarvingError> {
        if self.complete {
            return Err(CarvingError::GenerationComplete);
        }
        if self.tiles.is_empty() {
            return Err(CarvingError::Unconfigured);
        }
        Ok(())
    }

    fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        if cell.x() >= self.width || cell.y() >= self.height {
            return None;
        }
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        let index = row.checked_mul(width)?.checked_add(column)?;
        self.tiles.get_mut(index)
    }

    fn carve_room(&mut self, bounds: CellRect) {
        for cell in bounds.cells() {
            let classified = room_tile(&bounds, cell);
            if let Some(tile) = self.tile_mut(cell) {
                *tile = classified;
                let _ = self.walkable.insert(cell);
            }
        }
        self.rooms.push(bounds);
    }

    fn carve_corridor(&mut self, cells: &[CellCoord]) -> usize {
        let mut classified = 0;
        for &cell in cells {
            let Some(tile) = self.tile_mut(cell) else {
                continue;
            };
            if !tile.kind().is_room() {
                *tile = Tile::Corridor;
                classified += 1;
            }
            let _ = self.walkable.insert(cell);
        }
        self.corridors += 1;
        classified
    }

    fn seal_boundary(&mut self) {
        let (width, height) = (self.width, self.height);
        let ring = (0..width)
            .flat_map(|x| [CellCoord::new(x, 0), CellCoord::new(x, height - 1)])
            .chain((0..height).flat_map(|y| [CellCoord::new(0, y), CellCoord::new(width - 1, y)]));

        for cell in ring {
            if let Some(tile) = self.tile_mut(cell) {
                *tile = Tile::Wall;
            }
            let _ = self.walkable.remove(cell);
        }
    }
}

/// Classification of a cell inside a freshly carved room.
fn room_tile(bounds: &CellRect, cell: CellCoord) -> Tile {
    let left = cell.x() == bounds.min_x();
    let right = cell.x() + 1 == bounds.max_x();
    let bottom = cell.y() == bounds.min_y();
    let top = cell.y() + 1 == bounds.max_y();

    match (left, right, bottom, top) {
        (true, _, true, _) => Tile::RoomWallCorner(Corner::BottomLeft),
        (true, _, _, true) => Tile::RoomWallCorner(Corner::TopLeft),
        (_, true, true, _) => Tile::RoomWallCorner(Corner::BottomRight),
        (_, true, _, true) => Tile::RoomWallCorner(Corner::TopRight),
        (true, _, _, _) => Tile::RoomWall(Side::Left),
        (_, true, _, _) => Tile::RoomWall(Side::Right),
        (_, _, true, _) => Tile::RoomWall(Side::Bottom),
        (_, _, _, true) => Tile::RoomWall(Side::Top),
        _ => Tile::Floor,
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::ConfigureLabyrinth { width, height } = command {
        world.configure(width, height);
        out_events.push(Event::LabyrinthConfigured { width, height });
        return;
    }

    if let Err(reason) = world.ensure_carvable() {
        warn!(?command, ?reason, "carving command rejected");
        out_events.push(Event::CarvingRejected { reason });
        return;
    }

    match command {
        Command::ConfigureLabyrinth { .. } => {}
        Command::CarveRoom { bounds } => {
            world.carve_room(bounds);
            out_events.push(Event::RoomCarved { bounds });
        }
        Command::CarveCorridor { kind, cells } => {
            let classified = world.carve_corridor(&cells);
            out_events.push(Event::CorridorCarved { kind, classified });
        }
        Command::SealBoundary => {
            world.seal_boundary();
            out_events.push(Event::BoundarySealed);
        }
        Command::CompleteGeneration => {
            world.complete = true;
            let walkable = world.walkable.len();
            debug!(
                rooms = world.rooms.len(),
                corridors = world.corridors,
                walkable,
                "labyrinth generation completed"
            );
            out_events.push(Event::GenerationCompleted { walkable });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use labyrinth_core::{CellCoord, CellRect, LabyrinthView};

    use super::{ReachabilityField, World};

    /// Reports whether generation finished and the labyrinth may be read.
    #[must_use]
    pub fn is_generation_complete(world: &World) -> bool {
        world.complete
    }

    /// Provides the dimensions of the labyrinth.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.width, world.height)
    }

    /// Read-only view of the finished labyrinth.
    ///
    /// Returns `None` until generation completes.
    #[must_use]
    pub fn labyrinth_view(world: &World) -> Option<LabyrinthView<'_>> {
        world.complete.then(|| {
            LabyrinthView::new(&world.tiles, &world.walkable, world.width, world.height)
        })
    }

    /// Bounds of every carved room, in carving order.
    #[must_use]
    pub fn rooms(world: &World) -> &[CellRect] {
        &world.rooms
    }

    /// Number of corridors carved so far, extra connections included.
    #[must_use]
    pub fn corridor_count(world: &World) -> usize {
        world.corridors
    }

    /// Walkable cells reachable from `from`, or `None` before generation completes.
    #[must_use]
    pub fn reachability(world: &World, from: CellCoord) -> Option<ReachabilityField> {
        world
            .complete
            .then(|| ReachabilityField::flood(&world.walkable, from))
    }
}
