//! Flood fill over the walkable set of a finished labyrinth.

use std::collections::VecDeque;

use labyrinth_core::{CellCoord, Direction, WalkableSet};

/// Step counts from one source cell to every walkable cell connected to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachabilityField {
    source: CellCoord,
    width: u32,
    steps: Vec<Option<u32>>,
    reached: usize,
}

impl ReachabilityField {
    /// Floods the walkable set outward from `source` using 4-connected steps.
    ///
    /// A source outside the walkable set reaches nothing.
    #[must_use]
    pub fn flood(walkable: &WalkableSet, source: CellCoord) -> Self {
        let (width, height) = walkable.dimensions();
        let count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut field = Self {
            source,
            width,
            steps: vec![None; count],
            reached: 0,
        };
        if !walkable.contains(source) {
            return field;
        }

        let mut frontier = VecDeque::from([(source, 0_u32)]);
        field.mark(source, 0);
        while let Some((cell, steps)) = frontier.pop_front() {
            for next in Direction::ALL.iter().filter_map(|direction| cell.step(*direction)) {
                if walkable.contains(next) && field.steps_to(next).is_none() {
                    field.mark(next, steps + 1);
                    frontier.push_back((next, steps + 1));
                }
            }
        }
        field
    }

    fn mark(&mut self, cell: CellCoord, steps: u32) {
        if let Some(slot) = self.slot(cell).and_then(|index| self.steps.get_mut(index)) {
            *slot = Some(steps);
            self.reached += 1;
        }
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        if cell.x() >= self.width {
            return None;
        }
        let row = usize::try_from(cell.y()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell the flood started from.
    #[must_use]
    pub const fn source(&self) -> CellCoord {
        self.source
    }

    /// Fewest unit steps from the source, or `None` when the cell is cut off.
    #[must_use]
    pub fn steps_to(&self, cell: CellCoord) -> Option<u32> {
        self.slot(cell)
            .and_then(|index| self.steps.get(index).copied())
            .flatten()
    }

    /// Reports whether the flood reached the cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.steps_to(cell).is_some()
    }

    /// Number of cells connected to the source, the source included.
    #[must_use]
    pub const fn reached(&self) -> usize {
        self.reached
    }
}
