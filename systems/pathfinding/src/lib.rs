#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-first grid search over the walkable set of a finished labyrinth.
//!
//! The search expands the open node with the lowest `g + h`, breaking ties on
//! the lower heuristic and then on insertion order. Each node also carries the
//! set of cells used earlier on its current best path; a neighbour found in
//! that set is never revisited through that node. Step costs include the
//! neighbour's heuristic, so a returned route is not guaranteed to be the
//! shortest one.

use std::collections::{HashMap, HashSet};

use labyrinth_core::{CellCoord, CostTable, LabyrinthView, TileKind, WalkableSet};
use thiserror::Error;
use tracing::trace;

const NEIGHBOUR_OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Result of a completed search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// Cells to walk through, starting with the first step and ending at the goal.
    ///
    /// Empty when the start already is the goal.
    Found(Vec<CellCoord>),
    /// The open collection ran dry before reaching the goal.
    NoPath,
}

impl PathOutcome {
    /// First cell to step into, if a non-empty path was found.
    #[must_use]
    pub fn first_step(&self) -> Option<CellCoord> {
        match self {
            Self::Found(path) => path.first().copied(),
            Self::NoPath => None,
        }
    }
}

/// Reasons a search request is rejected before any work starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathQueryError {
    /// The start cell is not part of the walkable set.
    #[error("start cell {cell:?} is not walkable")]
    StartNotWalkable {
        /// Offending cell.
        cell: CellCoord,
    },
    /// The goal cell is not part of the walkable set.
    #[error("goal cell {cell:?} is not walkable")]
    GoalNotWalkable {
        /// Offending cell.
        cell: CellCoord,
    },
}

#[derive(Debug, Default)]
struct PathNode {
    g: f64,
    h: f64,
    predecessor: Option<CellCoord>,
    ancestors: HashSet<CellCoord>,
    open: bool,
    closed: bool,
    touched: bool,
}

impl PathNode {
    fn reset(&mut self) {
        self.g = 0.0;
        self.h = 0.0;
        self.predecessor = None;
        self.ancestors.clear();
        self.open = false;
        self.closed = false;
        self.touched = false;
    }

    fn f(&self) -> f64 {
        self.g + self.h
    }
}

#[derive(Debug, Default)]
struct NodePool {
    nodes: HashMap<CellCoord, PathNode>,
    touched: Vec<CellCoord>,
}

impl NodePool {
    fn reset(&mut self) {
        for cell in self.touched.drain(..) {
            if let Some(node) = self.nodes.get_mut(&cell) {
                node.reset();
            }
        }
    }

    fn node_mut(&mut self, cell: CellCoord) -> &mut PathNode {
        let node = self.nodes.entry(cell).or_default();
        if !node.touched {
            node.touched = true;
            self.touched.push(cell);
        }
        node
    }

    fn node(&self, cell: CellCoord) -> Option<&PathNode> {
        self.nodes.get(&cell).filter(|node| node.touched)
    }
}

/// Reusable search engine whose node pool persists between searches.
#[derive(Debug, Default)]
pub struct Pathfinder {
    pool: NodePool,
    open: Vec<CellCoord>,
}

impl Pathfinder {
    /// Creates a pathfinder with an empty node pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches the finished labyrinth exposed by `view`.
    pub fn find_path_in(
        &mut self,
        view: &LabyrinthView<'_>,
        start: CellCoord,
        goal: CellCoord,
        costs: &CostTable,
    ) -> Result<PathOutcome, PathQueryError> {
        self.find_path(view.walkable(), |cell| view.tile_kind(cell), start, goal, costs)
    }

    /// Searches for a 4-connected route from `start` to `goal`.
    ///
    /// `tile_of` supplies the classification used to pick each step's
    /// surcharge from `costs`.
    pub fn find_path<F>(
        &mut self,
        walkable: &WalkableSet,
        tile_of: F,
        start: CellCoord,
        goal: CellCoord,
        costs: &CostTable,
    ) -> Result<PathOutcome, PathQueryError>
    where
        F: Fn(CellCoord) -> Option<TileKind>,
    {
        if !walkable.contains(start) {
            return Err(PathQueryError::StartNotWalkable { cell: start });
        }
        if !walkable.contains(goal) {
            return Err(PathQueryError::GoalNotWalkable { cell: goal });
        }
        if start == goal {
            return Ok(PathOutcome::Found(Vec::new()));
        }

        self.pool.reset();
        self.open.clear();

        let start_node = self.pool.node_mut(start);
        start_node.h = start.euclidean_distance(goal);
        start_node.open = true;
        self.open.push(start);

        let mut expanded = 0_usize;
        while let Some(current) = self.pop_best() {
            expanded += 1;
            if current == goal {
                let path = self.reconstruct(start, goal);
                trace!(?start, ?goal, expanded, steps = path.len(), "path found");
                return Ok(PathOutcome::Found(path));
            }

            let current_node = self.pool.node_mut(current);
            current_node.open = false;
            current_node.closed = true;
            let current_g = current_node.g;
            let ancestors = std::mem::take(&mut current_node.ancestors);

            for (dx, dy) in NEIGHBOUR_OFFSETS {
                let Some(neighbour) = current.offset(dx, dy) else {
                    continue;
                };
                if !walkable.contains(neighbour) || ancestors.contains(&neighbour) {
                    continue;
                }

                let node = self.pool.node_mut(neighbour);
                if node.closed {
                    continue;
                }

                let h = neighbour.euclidean_distance(goal);
                let g = current_g + h + costs.surcharge(tile_of(neighbour));
                if node.open && g >= node.g {
                    continue;
                }

                node.g = g;
                node.h = h;
                node.predecessor = Some(current);
                node.ancestors.clear();
                node.ancestors.extend(ancestors.iter().copied());
                let _ = node.ancestors.insert(current);
                if !node.open {
                    node.open = true;
                    self.open.push(neighbour);
                }
            }

            self.pool.node_mut(current).ancestors = ancestors;
        }

        trace!(?start, ?goal, expanded, "open collection exhausted");
        Ok(PathOutcome::NoPath)
    }

    fn pop_best(&mut self) -> Option<CellCoord> {
        let mut best: Option<(usize, f64, f64)> = None;
        for (index, cell) in self.open.iter().enumerate() {
            let Some(node) = self.pool.node(*cell) else {
                continue;
            };
            let (f, h) = (node.f(), node.h);
            let better = match best {
                None => true,
                Some((_, best_f, best_h)) => f < best_f || (f == best_f && h < best_h),
            };
            if better {
                best = Some((index, f, h));
            }
        }
        best.map(|(index, _, _)| self.open.remove(index))
    }

    fn reconstruct(&self, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = goal;
        while cursor != start {
            path.push(cursor);
            match self.pool.node(cursor).and_then(|node| node.predecessor) {
                Some(previous) => cursor = previous,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
