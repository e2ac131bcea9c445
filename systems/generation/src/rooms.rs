//! Room placement inside leaf partitions.

use labyrinth_core::{CellCoord, CellRect};
use rand::Rng;
use tracing::debug;

use crate::{draw_between, partition::Partition};

const PLACEMENT_RETRIES: u32 = 75;

/// Outcome of placing a room inside a leaf partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomPlacement {
    bounds: CellRect,
    fallback: bool,
}

impl RoomPlacement {
    pub(crate) const fn exact(bounds: CellRect) -> Self {
        Self {
            bounds,
            fallback: false,
        }
    }

    /// Half-open bounds of the room.
    #[must_use]
    pub const fn bounds(&self) -> CellRect {
        self.bounds
    }

    /// Reports whether every attempt failed and the last candidate was kept.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Picks room bounds for a leaf partition.
///
/// Each candidate spans the partition midpoint on both axes. A candidate is
/// accepted once it clears the partition edges, stays inside the outer wall
/// ring of `labyrinth`, meets the minimum size, and keeps the midpoint inside
/// the room. The first candidate is redrawn up to 75 times; after that the
/// last candidate is used unchanged.
pub fn carve_room<R: Rng>(
    partition: &Partition,
    min_room_width: u32,
    min_room_height: u32,
    labyrinth: CellRect,
    rng: &mut R,
) -> RoomPlacement {
    let bounds = partition.bounds();
    let mid = bounds.center();

    let mut retries = PLACEMENT_RETRIES;
    let mut candidate = draw_room(bounds, mid, rng);
    while !acceptable(
        candidate,
        bounds,
        mid,
        labyrinth,
        min_room_width,
        min_room_height,
    ) {
        if retries == 0 {
            debug!(?bounds, room = ?candidate, "room placement fell back to last candidate");
            return RoomPlacement {
                bounds: candidate,
                fallback: true,
            };
        }
        candidate = draw_room(bounds, mid, rng);
        retries -= 1;
    }

    RoomPlacement {
        bounds: candidate,
        fallback: false,
    }
}

fn draw_room<R: Rng>(bounds: CellRect, mid: CellCoord, rng: &mut R) -> CellRect {
    let x1 = draw_between(rng, bounds.min_x(), mid.x());
    let x2 = draw_between(rng, mid.x(), bounds.max_x());
    let y1 = draw_between(rng, bounds.min_y(), mid.y());
    let y2 = draw_between(rng, mid.y(), bounds.max_y());
    CellRect::from_bounds(x1, x2, y1, y2)
}

fn acceptable(
    room: CellRect,
    bounds: CellRect,
    mid: CellCoord,
    labyrinth: CellRect,
    min_room_width: u32,
    min_room_height: u32,
) -> bool {
    let horizontal = room.min_x() > bounds.min_x()
        && room.max_x() < bounds.max_x()
        && room.min_x() > labyrinth.min_x()
        && room.max_x() < labyrinth.max_x()
        && room.width() >= min_room_width
        && room.max_x() > mid.x();
    let vertical = room.min_y() > bounds.min_y()
        && room.max_y() < bounds.max_y()
        && room.min_y() > labyrinth.min_y()
        && room.max_y() < labyrinth.max_y()
        && room.height() >= min_room_height
        && room.max_y() > mid.y();
    horizontal && vertical
}
