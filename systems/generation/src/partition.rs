//! Recursive binary partitioning of the labyrinth region.

use std::{
    hash::{Hash, Hasher},
    ops::Index,
};

use labyrinth_core::{CellCoord, CellRect};
use rand::Rng;
use tracing::debug;

use crate::{draw_between, rooms::RoomPlacement};

const SPLIT_RETRIES: u32 = 50;
/// Cells a child needs beyond the minimum room size: rooms keep one cell
/// clear of the partition edge on each side.
const ROOM_MARGIN: u32 = 2;
const SPLIT_RANGE_LOW: f64 = 0.4;
const SPLIT_RANGE_HIGH: f64 = 0.6;
const ORIENTATION_BIAS: f64 = 0.25;

/// Index of a partition inside its [`PartitionTree`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(usize);

impl PartitionId {
    /// Position of the partition within the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Orientation of the dividing line used to split a partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitAxis {
    /// Divides along a column; children sit side by side.
    Vertical,
    /// Divides along a row; children sit one above the other.
    Horizontal,
}

/// Unordered pair of sibling partitions that must be joined by a corridor.
#[derive(Clone, Copy, Debug, Eq)]
pub struct CorridorEdge {
    a: PartitionId,
    b: PartitionId,
}

impl CorridorEdge {
    /// Creates an edge between two partitions.
    #[must_use]
    pub const fn new(a: PartitionId, b: PartitionId) -> Self {
        Self { a, b }
    }

    /// Endpoints in the order the edge was created with.
    #[must_use]
    pub const fn endpoints(&self) -> (PartitionId, PartitionId) {
        (self.a, self.b)
    }

    fn key(&self) -> (PartitionId, PartitionId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

impl PartialEq for CorridorEdge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Hash for CorridorEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Rectangular sub-region produced by recursive splitting.
#[derive(Clone, Debug)]
pub struct Partition {
    bounds: CellRect,
    room: Option<RoomPlacement>,
    children: Option<[PartitionId; 2]>,
    parent: Option<PartitionId>,
    corridor: Option<CorridorEdge>,
    depth: u32,
    abandoned: bool,
}

impl Partition {
    fn new(bounds: CellRect, parent: Option<PartitionId>, depth: u32) -> Self {
        Self {
            bounds,
            room: None,
            children: None,
            parent,
            corridor: None,
            depth,
            abandoned: false,
        }
    }

    /// Half-open bounds of the partition.
    #[must_use]
    pub const fn bounds(&self) -> CellRect {
        self.bounds
    }

    /// Room carved inside the partition, if any.
    #[must_use]
    pub fn room(&self) -> Option<CellRect> {
        self.room.map(|placement| placement.bounds())
    }

    /// Reports whether the room kept its last candidate after every
    /// placement attempt failed.
    ///
    /// Such rooms may be undersized, touch the partition edge, or miss the
    /// anchor, so they can end up cut off from the corridors.
    #[must_use]
    pub fn has_fallback_room(&self) -> bool {
        self.room.is_some_and(|placement| placement.is_fallback())
    }

    /// Children created when the partition was split.
    #[must_use]
    pub const fn children(&self) -> Option<[PartitionId; 2]> {
        self.children
    }

    /// Partition this one was split from.
    #[must_use]
    pub const fn parent(&self) -> Option<PartitionId> {
        self.parent
    }

    /// Corridor edge linking the partition to its sibling.
    #[must_use]
    pub const fn corridor(&self) -> Option<CorridorEdge> {
        self.corridor
    }

    /// Number of splits between the root and this partition.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Reports whether the partition has no children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Reports whether every split attempt for this partition failed.
    ///
    /// Abandoned partitions never receive a room and remain solid wall.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Cell corridors attach to.
    ///
    /// This is the partition midpoint. Room placement keeps it inside the
    /// room of a carved leaf, and it lies on the corridor joining the
    /// children of a split partition.
    #[must_use]
    pub const fn anchor(&self) -> CellCoord {
        self.bounds.center()
    }
}

#[derive(Clone, Copy, Debug)]
struct SplitLimits {
    min_room_width: u32,
    min_room_height: u32,
}

/// Arena-backed binary tree of partitions.
///
/// Children are recorded on a pending stack in sibling pairs as they are
/// created; room carving and corridor routing consume that stack.
#[derive(Clone, Debug)]
pub struct PartitionTree {
    partitions: Vec<Partition>,
    pending: Vec<PartitionId>,
    abandoned: usize,
}

impl PartitionTree {
    /// Identifier of the root partition.
    pub const ROOT: PartitionId = PartitionId(0);

    /// Recursively splits `region` up to `max_depth` levels deep.
    pub fn build<R: Rng>(
        region: CellRect,
        max_depth: u32,
        min_room_width: u32,
        min_room_height: u32,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self {
            partitions: vec![Partition::new(region, None, 0)],
            pending: Vec::new(),
            abandoned: 0,
        };
        let limits = SplitLimits {
            min_room_width,
            min_room_height,
        };
        let axis = if rng.gen_bool(0.5) {
            SplitAxis::Vertical
        } else {
            SplitAxis::Horizontal
        };
        tree.subdivide(Self::ROOT, max_depth, axis, limits, rng);
        tree
    }

    fn subdivide<R: Rng>(
        &mut self,
        id: PartitionId,
        depth: u32,
        axis: SplitAxis,
        limits: SplitLimits,
        rng: &mut R,
    ) {
        if depth == 0 {
            return;
        }

        let bounds = self.partitions[id.0].bounds;
        let Some(split) = choose_split(bounds, axis, limits, rng) else {
            self.partitions[id.0].abandoned = true;
            self.abandoned += 1;
            debug!(partition = id.0, ?axis, ?bounds, "split abandoned after retries");
            return;
        };

        let (first_bounds, second_bounds) = match axis {
            SplitAxis::Vertical => (
                CellRect::from_bounds(bounds.min_x(), split, bounds.min_y(), bounds.max_y()),
                CellRect::from_bounds(split + 1, bounds.max_x(), bounds.min_y(), bounds.max_y()),
            ),
            SplitAxis::Horizontal => (
                CellRect::from_bounds(bounds.min_x(), bounds.max_x(), bounds.min_y(), split),
                CellRect::from_bounds(bounds.min_x(), bounds.max_x(), split + 1, bounds.max_y()),
            ),
        };

        let level = self.partitions[id.0].depth + 1;
        let first = self.push(Partition::new(first_bounds, Some(id), level));
        let second = self.push(Partition::new(second_bounds, Some(id), level));
        let edge = CorridorEdge::new(first, second);
        self.partitions[first.0].corridor = Some(edge);
        self.partitions[second.0].corridor = Some(edge);
        self.partitions[id.0].children = Some([first, second]);
        self.pending.push(first);
        self.pending.push(second);

        let first_axis = next_axis(axis, rng);
        self.subdivide(first, depth - 1, first_axis, limits, rng);
        let second_axis = next_axis(axis, rng);
        self.subdivide(second, depth - 1, second_axis, limits, rng);
    }

    fn push(&mut self, partition: Partition) -> PartitionId {
        let id = PartitionId(self.partitions.len());
        self.partitions.push(partition);
        id
    }

    /// Pops the most recently created partition awaiting carving.
    pub fn pop_pending(&mut self) -> Option<PartitionId> {
        self.pending.pop()
    }

    /// Number of partitions awaiting carving.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of partitions, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Always `false`; a tree holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Number of partitions whose split was abandoned.
    #[must_use]
    pub fn abandoned_splits(&self) -> usize {
        self.abandoned
    }

    /// Partition with the provided identifier, if it exists.
    #[must_use]
    pub fn get(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(id.0)
    }

    /// Iterates partitions in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (PartitionId, &Partition)> {
        self.partitions
            .iter()
            .enumerate()
            .map(|(index, partition)| (PartitionId(index), partition))
    }

    pub(crate) fn set_room(&mut self, id: PartitionId, room: RoomPlacement) {
        if let Some(partition) = self.partitions.get_mut(id.0) {
            partition.room = Some(room);
        }
    }
}

impl Index<PartitionId> for PartitionTree {
    type Output = Partition;

    fn index(&self, id: PartitionId) -> &Partition {
        &self.partitions[id.0]
    }
}

fn choose_split<R: Rng>(
    bounds: CellRect,
    axis: SplitAxis,
    limits: SplitLimits,
    rng: &mut R,
) -> Option<u32> {
    let (start, end, minimum) = match axis {
        SplitAxis::Vertical => (bounds.min_x(), bounds.max_x(), limits.min_room_width),
        SplitAxis::Horizontal => (bounds.min_y(), bounds.max_y(), limits.min_room_height),
    };
    let low = lerp(start, end, SPLIT_RANGE_LOW);
    let high = lerp(start, end, SPLIT_RANGE_HIGH);
    let needed = minimum.saturating_add(ROOM_MARGIN);
    let fits = |split: u32| {
        split.saturating_sub(start) >= needed
            && end.saturating_sub(split).saturating_sub(1) >= needed
    };

    let mut split = draw_between(rng, low, high);
    let mut retries = SPLIT_RETRIES;
    while !fits(split) {
        if retries == 0 {
            return None;
        }
        split = draw_between(rng, low, high);
        retries -= 1;
    }
    Some(split)
}

fn next_axis<R: Rng>(parent: SplitAxis, rng: &mut R) -> SplitAxis {
    let noise: f64 = rng.gen();
    let vertical = match parent {
        SplitAxis::Vertical => noise <= ORIENTATION_BIAS,
        SplitAxis::Horizontal => noise > ORIENTATION_BIAS,
    };
    if vertical {
        SplitAxis::Vertical
    } else {
        SplitAxis::Horizontal
    }
}

fn lerp(start: u32, end: u32, t: f64) -> u32 {
    let start = f64::from(start);
    let end = f64::from(end);
    (start + (end - start) * t) as u32
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn build(seed: u64, depth: u32) -> PartitionTree {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        PartitionTree::build(CellRect::from_bounds(0, 80, 0, 60), depth, 4, 4, &mut rng)
    }

    #[test]
    fn corridor_edges_are_symmetric() {
        let a = PartitionId(3);
        let b = PartitionId(7);
        assert_eq!(CorridorEdge::new(a, b), CorridorEdge::new(b, a));
        assert_ne!(CorridorEdge::new(a, b), CorridorEdge::new(a, PartitionId(8)));

        let mut edges = HashSet::new();
        assert!(edges.insert(CorridorEdge::new(a, b)));
        assert!(!edges.insert(CorridorEdge::new(b, a)));
    }

    #[test]
    fn depth_zero_leaves_a_single_root() {
        let tree = build(11, 0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.pending_len(), 0);
        assert!(tree[PartitionTree::ROOT].is_leaf());
        assert!(!tree[PartitionTree::ROOT].is_abandoned());
    }

    #[test]
    fn children_are_disjoint_and_inside_their_parent() {
        for seed in [1, 2, 3, 4] {
            let tree = build(seed, 4);
            for (id, partition) in tree.iter() {
                let Some([first, second]) = partition.children() else {
                    continue;
                };
                let (first, second) = (&tree[first], &tree[second]);
                assert!(partition.bounds().encloses(&first.bounds()));
                assert!(partition.bounds().encloses(&second.bounds()));
                assert!(
                    first.bounds().cells().all(|cell| !second.bounds().contains(cell)),
                    "children of partition {} overlap",
                    id.index()
                );
                assert_eq!(first.parent(), Some(id));
                assert_eq!(first.corridor(), second.corridor());
                assert_eq!(first.depth(), partition.depth() + 1);
            }
        }
    }

    #[test]
    fn siblings_share_one_anchor_axis() {
        let tree = build(5, 4);
        for (_, partition) in tree.iter() {
            let Some([first, second]) = partition.children() else {
                continue;
            };
            let (a, b) = (tree[first].anchor(), tree[second].anchor());
            assert!(
                a.x() == b.x() || a.y() == b.y(),
                "sibling anchors {a:?} and {b:?} are not aligned"
            );
        }
    }

    #[test]
    fn split_lands_in_the_middle_fifth() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let bounds = CellRect::from_bounds(0, 100, 0, 100);
        let limits = SplitLimits {
            min_room_width: 4,
            min_room_height: 4,
        };
        for _ in 0..64 {
            let split = choose_split(bounds, SplitAxis::Vertical, limits, &mut rng)
                .expect("wide partition splits");
            assert!((40..60).contains(&split), "split {split} outside the middle range");
        }
    }

    #[test]
    fn abandoned_split_spends_one_draw_plus_every_retry() {
        let bounds = CellRect::from_bounds(0, 12, 0, 12);
        let limits = SplitLimits {
            min_room_width: 6,
            min_room_height: 6,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut replay = rng.clone();

        assert_eq!(choose_split(bounds, SplitAxis::Vertical, limits, &mut rng), None);

        let (low, high) = (lerp(0, 12, SPLIT_RANGE_LOW), lerp(0, 12, SPLIT_RANGE_HIGH));
        for _ in 0..=SPLIT_RETRIES {
            let _ = draw_between(&mut replay, low, high);
        }
        assert_eq!(rng.gen::<u64>(), replay.gen::<u64>(), "draw count differs");
    }

    #[test]
    fn children_leave_room_for_a_margin_around_the_minimum_room() {
        let limits = SplitLimits {
            min_room_width: 5,
            min_room_height: 4,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        // Draws land in [6, 9); only 7 leaves both children at least 7 wide.
        let bounds = CellRect::from_bounds(0, 15, 0, 30);
        for _ in 0..16 {
            let split = choose_split(bounds, SplitAxis::Vertical, limits, &mut rng);
            assert!(matches!(split, None | Some(7)), "split {split:?} leaves a cramped child");
        }
    }

    #[test]
    fn narrow_partitions_abandon_the_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let tree = PartitionTree::build(CellRect::from_bounds(0, 12, 0, 12), 3, 6, 6, &mut rng);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.abandoned_splits(), 1);
        assert!(tree[PartitionTree::ROOT].is_abandoned());
    }

    #[test]
    fn pending_stack_holds_sibling_pairs() {
        let mut tree = build(21, 3);
        assert_eq!(tree.pending_len() % 2, 0);
        while let Some(second) = tree.pop_pending() {
            let first = tree.pop_pending().expect("siblings are pushed in pairs");
            assert_eq!(tree[first].parent(), tree[second].parent());
        }
    }
}
