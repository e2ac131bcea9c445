#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the labyrinth engine.
//!
//! This crate defines the message surface that connects the generation
//! system, the authoritative world, and the consumers that navigate the
//! finished labyrinth. Generation submits [`Command`] values describing
//! carving operations, the world executes those commands via its `apply`
//! entry point, and then broadcasts [`Event`] values. Consumers only ever see
//! the finished labyrinth through the read-only [`LabyrinthView`].

mod config;

pub use config::{ensure_probability, ConfigError, CostTable, GenerationConfig};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible labyrinth mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the labyrinth to the provided dimensions, filled entirely with walls.
    ConfigureLabyrinth {
        /// Number of cell columns in the labyrinth.
        width: u32,
        /// Number of cell rows in the labyrinth.
        height: u32,
    },
    /// Classifies the provided rectangle as a room and marks every cell walkable.
    CarveRoom {
        /// Half-open bounds of the room.
        bounds: CellRect,
    },
    /// Marks the listed cells walkable and classifies them as corridor unless
    /// they already belong to a room.
    CarveCorridor {
        /// Reason the corridor exists.
        kind: CorridorKind,
        /// Cells traversed by the corridor, in walking order.
        cells: Vec<CellCoord>,
    },
    /// Re-stamps the outer boundary ring as wall and removes it from the walkable set.
    SealBoundary,
    /// Freezes the labyrinth. Later carving commands are rejected.
    CompleteGeneration,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the labyrinth was reset to the provided dimensions.
    LabyrinthConfigured {
        /// Number of cell columns in the labyrinth.
        width: u32,
        /// Number of cell rows in the labyrinth.
        height: u32,
    },
    /// Confirms that a room was carved.
    RoomCarved {
        /// Half-open bounds of the room.
        bounds: CellRect,
    },
    /// Confirms that a corridor was carved.
    CorridorCarved {
        /// Reason the corridor exists.
        kind: CorridorKind,
        /// Number of cells that received the corridor classification.
        classified: usize,
    },
    /// Confirms that the boundary ring was re-stamped as wall.
    BoundarySealed,
    /// Signals that generation finished and the labyrinth is now read-only.
    GenerationCompleted {
        /// Number of walkable cells in the finished labyrinth.
        walkable: usize,
    },
    /// Reports that a carving command was ignored.
    CarvingRejected {
        /// Specific reason the command was ignored.
        reason: CarvingError,
    },
}

/// Reasons a carving command may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarvingError {
    /// The labyrinth has no cells because it was never configured.
    Unconfigured,
    /// Generation already completed; the labyrinth is read-only.
    GenerationComplete,
}

/// Origin of a carved corridor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CorridorKind {
    /// Connects two sibling leaf partitions that both received rooms.
    RoomToRoom,
    /// Connects two sibling partitions where at least one is subdivided further.
    PartitionToPartition,
    /// Redundant connection that introduces cycles into the corridor graph.
    Extra,
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing `y`.
    North,
    /// Movement toward decreasing `y`.
    South,
    /// Movement toward decreasing `x`.
    West,
    /// Movement toward increasing `x`.
    East,
}

impl Direction {
    /// Every direction, in the order random walkers sample them.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Signed `(dx, dy)` offset of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell. Rows grow toward the top side.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Computes the straight-line distance between two cell coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: CellCoord) -> f64 {
        let dx = f64::from(self.x.abs_diff(other.x));
        let dy = f64::from(self.y.abs_diff(other.y));
        dx.hypot(dy)
    }

    /// Cell displaced by the signed offset, or `None` when it would leave the
    /// unsigned coordinate space.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<CellCoord> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self::new(x, y))
    }

    /// Neighbouring cell one step in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

/// Axis-aligned, half-open rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Constructs a rectangle covering `[min_x, max_x) × [min_y, max_y)`.
    ///
    /// Inverted bounds collapse to an empty rectangle anchored at the minimum.
    #[must_use]
    pub const fn from_bounds(min_x: u32, max_x: u32, min_y: u32, max_y: u32) -> Self {
        Self {
            origin: CellCoord::new(min_x, min_y),
            size: CellRectSize::new(max_x.saturating_sub(min_x), max_y.saturating_sub(min_y)),
        }
    }

    /// Lower-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Inclusive lower `x` bound.
    #[must_use]
    pub const fn min_x(&self) -> u32 {
        self.origin.x
    }

    /// Exclusive upper `x` bound.
    #[must_use]
    pub const fn max_x(&self) -> u32 {
        self.origin.x + self.size.width
    }

    /// Inclusive lower `y` bound.
    #[must_use]
    pub const fn min_y(&self) -> u32 {
        self.origin.y
    }

    /// Exclusive upper `y` bound.
    #[must_use]
    pub const fn max_y(&self) -> u32 {
        self.origin.y + self.size.height
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size.height
    }

    /// Reports whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Midpoint of the half-open bounds, rounded toward the origin.
    #[must_use]
    pub const fn center(&self) -> CellCoord {
        CellCoord::new(
            (self.min_x() + self.max_x()) / 2,
            (self.min_y() + self.max_y()) / 2,
        )
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min_x()
            && cell.x < self.max_x()
            && cell.y >= self.min_y()
            && cell.y < self.max_y()
    }

    /// Reports whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub const fn encloses(&self, other: &CellRect) -> bool {
        other.min_x() >= self.min_x()
            && other.max_x() <= self.max_x()
            && other.min_y() >= self.min_y()
            && other.max_y() <= self.max_y()
    }

    /// Iterates every covered cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (min_x, max_x) = (self.min_x(), self.max_x());
        (self.min_y()..self.max_y())
            .flat_map(move |y| (min_x..max_x).map(move |x| CellCoord::new(x, y)))
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Coarse classification of a labyrinth cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid fill that blocks movement.
    Wall,
    /// Room interior.
    Floor,
    /// Cell carved by a corridor outside any room.
    Corridor,
    /// Non-corner room perimeter. Walkable despite the name.
    RoomWall,
    /// Room perimeter corner. Walkable despite the name.
    RoomWallCorner,
}

impl TileKind {
    /// Reports whether the classification belongs to a carved room.
    #[must_use]
    pub const fn is_room(self) -> bool {
        matches!(self, Self::Floor | Self::RoomWall | Self::RoomWallCorner)
    }
}

/// Side of a room occupied by a [`Tile::RoomWall`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Minimum `x` column.
    Left,
    /// Maximum `x` column.
    Right,
    /// Minimum `y` row.
    Bottom,
    /// Maximum `y` row.
    Top,
}

/// Corner of a room occupied by a [`Tile::RoomWallCorner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Minimum `x`, minimum `y`.
    BottomLeft,
    /// Minimum `x`, maximum `y`.
    TopLeft,
    /// Maximum `x`, minimum `y`.
    BottomRight,
    /// Maximum `x`, maximum `y`.
    TopRight,
}

/// Classified labyrinth cell, including the orientation renderers need.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Solid fill that blocks movement.
    #[default]
    Wall,
    /// Room interior.
    Floor,
    /// Corridor cell outside any room.
    Corridor,
    /// Room perimeter on the given side.
    RoomWall(Side),
    /// Room perimeter at the given corner.
    RoomWallCorner(Corner),
}

impl Tile {
    /// Coarse classification without orientation.
    #[must_use]
    pub const fn kind(self) -> TileKind {
        match self {
            Self::Wall => TileKind::Wall,
            Self::Floor => TileKind::Floor,
            Self::Corridor => TileKind::Corridor,
            Self::RoomWall(_) => TileKind::RoomWall,
            Self::RoomWallCorner(_) => TileKind::RoomWallCorner,
        }
    }

    /// Counter-clockwise rotation, in degrees, applied to the tile artwork.
    ///
    /// Tiles without an orientation report zero.
    #[must_use]
    pub const fn rotation_degrees(self) -> u16 {
        match self {
            Self::RoomWall(Side::Left) | Self::RoomWallCorner(Corner::BottomLeft) => 180,
            Self::RoomWall(Side::Top) | Self::RoomWallCorner(Corner::TopLeft) => 90,
            Self::RoomWall(Side::Bottom) | Self::RoomWallCorner(Corner::BottomRight) => 270,
            _ => 0,
        }
    }
}

/// Dense set of coordinates agents may occupy or traverse.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkableSet {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    len: usize,
}

impl WalkableSet {
    /// Creates an empty set covering a `width × height` grid.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![false; count],
            len: 0,
        }
    }

    /// Adds the cell, returning `true` when it was not already present.
    ///
    /// Cells outside the grid are ignored.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        if self.cells[index] {
            return false;
        }
        self.cells[index] = true;
        self.len += 1;
        true
    }

    /// Removes the cell, returning `true` when it was present.
    pub fn remove(&mut self, cell: CellCoord) -> bool {
        let Some(index) = self.index(cell) else {
            return false;
        };
        if !self.cells[index] {
            return false;
        }
        self.cells[index] = false;
        self.len -= 1;
        true
    }

    /// Reports whether the cell is walkable.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of walkable cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether no cell is walkable.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Iterates walkable cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, walkable)| **walkable)
            .map(move |(index, _)| CellCoord::new((index % width) as u32, (index / width) as u32))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        grid_index(self.width, self.height, cell)
    }
}

/// Read-only view of a finished labyrinth.
#[derive(Clone, Copy, Debug)]
pub struct LabyrinthView<'a> {
    tiles: &'a [Tile],
    walkable: &'a WalkableSet,
    width: u32,
    height: u32,
}

impl<'a> LabyrinthView<'a> {
    /// Captures a new view backed by row-major tiles and the walkable set.
    #[must_use]
    pub fn new(tiles: &'a [Tile], walkable: &'a WalkableSet, width: u32, height: u32) -> Self {
        Self {
            tiles,
            walkable,
            width,
            height,
        }
    }

    /// Classified tile at the provided cell, if it lies inside the labyrinth.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        grid_index(self.width, self.height, cell).and_then(|index| self.tiles.get(index).copied())
    }

    /// Coarse classification at the provided cell.
    #[must_use]
    pub fn tile_kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.tile(cell).map(Tile::kind)
    }

    /// Reports whether agents may occupy the cell.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.walkable.contains(cell)
    }

    /// Walkable set backing the view.
    #[must_use]
    pub fn walkable(&self) -> &'a WalkableSet {
        self.walkable
    }

    /// Provides the dimensions of the labyrinth.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Rectangle covering every cell of the labyrinth.
    #[must_use]
    pub const fn bounds(&self) -> CellRect {
        CellRect::from_bounds(0, self.width, 0, self.height)
    }
}

fn grid_index(width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    if cell.x >= width || cell.y >= height {
        return None;
    }
    let row = usize::try_from(cell.y).ok()?;
    let column = usize::try_from(cell.x).ok()?;
    let width = usize::try_from(width).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellRect, Corner, Direction, Side, Tile, TileKind, WalkableSet};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn euclidean_distance_is_symmetric() {
        let origin = CellCoord::new(0, 0);
        let destination = CellCoord::new(3, 4);
        assert!((origin.euclidean_distance(destination) - 5.0).abs() < f64::EPSILON);
        assert!((destination.euclidean_distance(origin) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn offset_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 2);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::South), Some(CellCoord::new(0, 1)));
        assert_eq!(origin.offset(1, 1), Some(CellCoord::new(1, 3)));
    }

    #[test]
    fn rect_center_uses_half_open_bounds() {
        let rect = CellRect::from_bounds(0, 10, 4, 9);
        assert_eq!(rect.center(), CellCoord::new(5, 6));
        assert!(rect.contains(CellCoord::new(9, 8)));
        assert!(!rect.contains(CellCoord::new(10, 8)));
        assert_eq!(rect.cells().count(), 50);
    }

    #[test]
    fn inverted_bounds_collapse_to_empty() {
        let rect = CellRect::from_bounds(5, 3, 0, 2);
        assert!(rect.is_empty());
        assert_eq!(rect.cells().count(), 0);
    }

    #[test]
    fn walkable_set_tracks_membership() {
        let mut set = WalkableSet::new(4, 3);
        assert!(set.insert(CellCoord::new(3, 2)));
        assert!(!set.insert(CellCoord::new(3, 2)));
        assert!(!set.insert(CellCoord::new(4, 0)));
        assert!(set.insert(CellCoord::new(0, 1)));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![CellCoord::new(0, 1), CellCoord::new(3, 2)]
        );
        assert!(set.remove(CellCoord::new(0, 1)));
        assert!(!set.contains(CellCoord::new(0, 1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn room_tiles_report_orientation() {
        assert_eq!(Tile::RoomWallCorner(Corner::BottomLeft).rotation_degrees(), 180);
        assert_eq!(Tile::RoomWallCorner(Corner::TopRight).rotation_degrees(), 0);
        assert_eq!(Tile::RoomWall(Side::Bottom).rotation_degrees(), 270);
        assert_eq!(Tile::RoomWall(Side::Top).rotation_degrees(), 90);
        assert_eq!(Tile::Floor.rotation_degrees(), 0);
        assert!(Tile::RoomWall(Side::Left).kind().is_room());
        assert!(!TileKind::Corridor.is_room());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::RoomWallCorner(Corner::TopLeft));
    }

    #[test]
    fn cell_rect_round_trips_through_bincode() {
        assert_round_trip(&CellRect::from_bounds(2, 9, 3, 7));
    }
}
