use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;

use glam::IVec2;

use crate::topology::{Adjacency, Layout};

use super::{Cursor, Node, NodeId, Roster};

/// Every node of the game, the current mosaic layout and the adjacency
/// derived from it.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, Node>,
    layout: Layout,
}

impl NodeRegistry {
    pub fn new(roster: &Roster, start: IVec2) -> Self {
        let nodes: BTreeMap<NodeId, Node> = roster
            .nodes()
            .iter()
            .map(|spec| (spec.id, Node::from_spec(spec, start)))
            .collect();
        let layout = Layout::new(nodes.keys().copied().collect());

        let mut registry = Self { nodes, layout };
        registry.install_adjacency();
        registry
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn cursor(&self, id: NodeId) -> Option<Cursor> {
        self.nodes.get(&id).map(|node| node.cursor)
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.alive)
    }

    pub fn is_present(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(Node::is_present)
    }

    pub fn alive_ids(&self) -> BTreeSet<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.alive)
            .map(|node| node.id)
            .collect()
    }

    /// Alive cursors rendered on this node, in ascending id order.
    pub fn present_ids(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|node| node.is_present())
            .map(|node| node.id)
            .collect()
    }

    pub fn addr(&self, id: NodeId) -> Option<SocketAddr> {
        self.nodes.get(&id).map(|node| node.addr)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn adjacency(&self, id: NodeId) -> Adjacency {
        self.nodes
            .get(&id)
            .map_or(Adjacency::ISOLATED, |node| node.adjacency)
    }

    /// Installs `order` as the layout, reconciled against the alive set.
    pub fn set_layout(&mut self, order: &[NodeId]) {
        self.layout = Layout::reconcile(order, &self.alive_ids());
        self.install_adjacency();
    }

    /// Marks `ids` dead and drops them from the layout.
    ///
    /// Returns the ids that were alive before the call; ids already dead or
    /// unknown are skipped, so re-applying the same elimination is a no-op.
    pub fn eliminate(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut newly = Vec::new();
        for &id in ids {
            if let Some(node) = self.nodes.get_mut(&id) {
                if node.alive {
                    node.alive = false;
                    newly.push(id);
                }
            }
        }

        if !newly.is_empty() {
            self.layout.remove_all(&newly);
            self.install_adjacency();
        }
        newly
    }

    pub(crate) fn place(&mut self, id: NodeId, position: IVec2, present: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.cursor.position = position;
            node.cursor.on_this_node = present;
        }
    }

    pub(crate) fn set_present(&mut self, id: NodeId, present: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.cursor.on_this_node = present;
        }
    }

    fn install_adjacency(&mut self) {
        let adjacency = self.layout.adjacency();
        for node in self.nodes.values_mut() {
            node.adjacency = adjacency
                .get(&node.id)
                .copied()
                .unwrap_or(Adjacency::ISOLATED);
        }
    }
}
