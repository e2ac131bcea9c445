//! Corridor routing between partition anchors.

use labyrinth_core::{CellCoord, Command, CorridorKind};

use crate::partition::{CorridorEdge, PartitionId, PartitionTree};

/// Order in which an L-shaped corridor covers its two axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bend {
    /// Walk along the row first, then along the column.
    HorizontalFirst,
    /// Walk along the column first, then along the row.
    VerticalFirst,
}

/// Cells of a 4-connected corridor from `from` to `to`, both ends included.
///
/// Aligned endpoints produce a straight run regardless of `bend`.
#[must_use]
pub fn route(from: CellCoord, to: CellCoord, bend: Bend) -> Vec<CellCoord> {
    let corner = match bend {
        Bend::HorizontalFirst => CellCoord::new(to.x(), from.y()),
        Bend::VerticalFirst => CellCoord::new(from.x(), to.y()),
    };

    let capacity = usize::try_from(from.manhattan_distance(to)).unwrap_or(0) + 1;
    let mut cells = Vec::with_capacity(capacity);
    cells.push(from);
    walk_straight(&mut cells, from, corner);
    walk_straight(&mut cells, corner, to);
    cells
}

fn walk_straight(cells: &mut Vec<CellCoord>, from: CellCoord, to: CellCoord) {
    let mut current = from;
    while current != to {
        current = if current.x() != to.x() {
            let x = if current.x() < to.x() {
                current.x() + 1
            } else {
                current.x() - 1
            };
            CellCoord::new(x, current.y())
        } else {
            let y = if current.y() < to.y() {
                current.y() + 1
            } else {
                current.y() - 1
            };
            CellCoord::new(current.x(), y)
        };
        cells.push(current);
    }
}

/// Command joining the two siblings of a tree edge.
///
/// `both_leaves` marks an edge whose endpoints both received rooms.
#[must_use]
pub fn connect(tree: &PartitionTree, edge: CorridorEdge, both_leaves: bool) -> Command {
    let (a, b) = edge.endpoints();
    let kind = if both_leaves {
        CorridorKind::RoomToRoom
    } else {
        CorridorKind::PartitionToPartition
    };
    Command::CarveCorridor {
        kind,
        cells: route(tree[a].anchor(), tree[b].anchor(), Bend::HorizontalFirst),
    }
}

/// Command joining two arbitrary partitions with an L-shaped corridor.
#[must_use]
pub fn connect_extra(tree: &PartitionTree, a: PartitionId, b: PartitionId, bend: Bend) -> Command {
    Command::CarveCorridor {
        kind: CorridorKind::Extra,
        cells: route(tree[a].anchor(), tree[b].anchor(), bend),
    }
}
