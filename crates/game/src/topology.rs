use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::grid::Direction;
use crate::node::NodeId;

pub const MOSAIC_SLOTS: usize = 4;

// Neighbor slot of each mosaic slot, ordered up/right/down/left.
// Slots: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
const SLOT_NEIGHBORS: [[Option<usize>; 4]; MOSAIC_SLOTS] = [
    [None, Some(1), Some(2), None],
    [None, None, Some(3), Some(0)],
    [Some(0), Some(3), None, None],
    [Some(1), None, None, Some(2)],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Adjacency {
    pub up: Option<NodeId>,
    pub right: Option<NodeId>,
    pub down: Option<NodeId>,
    pub left: Option<NodeId>,
}

impl Adjacency {
    pub const ISOLATED: Adjacency = Adjacency {
        up: None,
        right: None,
        down: None,
        left: None,
    };

    pub fn new(
        up: Option<NodeId>,
        right: Option<NodeId>,
        down: Option<NodeId>,
        left: Option<NodeId>,
    ) -> Self {
        Self {
            up,
            right,
            down,
            left,
        }
    }

    pub fn toward(&self, direction: Direction) -> Option<NodeId> {
        match direction {
            Direction::Up => self.up,
            Direction::Right => self.right,
            Direction::Down => self.down,
            Direction::Left => self.left,
        }
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> {
        [self.up, self.right, self.down, self.left]
            .into_iter()
            .flatten()
    }

    pub fn references(&self, id: NodeId) -> bool {
        self.neighbors().any(|n| n == id)
    }
}

impl fmt::Display for Adjacency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = |n: Option<NodeId>| n.map_or_else(|| "-".to_string(), |id| id.to_string());
        write!(
            f,
            "(up={} right={} down={} left={})",
            slot(self.up),
            slot(self.right),
            slot(self.down),
            slot(self.left)
        )
    }
}

/// Derives every placed node's neighbors from its slot in the 2x2 mosaic.
///
/// Ids past the fourth slot are ignored; empty slots yield no neighbor.
pub fn compute_adjacency(layout: &[NodeId]) -> BTreeMap<NodeId, Adjacency> {
    let slot = |index: Option<usize>| index.and_then(|i| layout.get(i).copied());

    layout
        .iter()
        .take(MOSAIC_SLOTS)
        .enumerate()
        .map(|(index, &id)| {
            let [up, right, down, left] = SLOT_NEIGHBORS[index];
            (id, Adjacency::new(slot(up), slot(right), slot(down), slot(left)))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    slots: Vec<NodeId>,
}

impl Layout {
    pub fn new(slots: Vec<NodeId>) -> Self {
        Self { slots }
    }

    /// Builds a layout from a proposed order, restricted to `alive`.
    ///
    /// Unknown, dead and duplicate ids are dropped; alive ids the order
    /// omits are appended in ascending order.
    pub fn reconcile(order: &[NodeId], alive: &BTreeSet<NodeId>) -> Self {
        let mut slots: Vec<NodeId> = Vec::with_capacity(alive.len());
        for &id in order {
            if alive.contains(&id) && !slots.contains(&id) {
                slots.push(id);
            }
        }
        for &id in alive {
            if !slots.contains(&id) {
                slots.push(id);
            }
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[NodeId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.contains(&id)
    }

    /// Removes `ids`, keeping the remaining order. Returns true if anything changed.
    pub fn remove_all(&mut self, ids: &[NodeId]) -> bool {
        let before = self.slots.len();
        self.slots.retain(|id| !ids.contains(id));
        self.slots.len() != before
    }

    pub fn adjacency(&self) -> BTreeMap<NodeId, Adjacency> {
        compute_adjacency(&self.slots)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.slots.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}]", ids.join(","))
    }
}
