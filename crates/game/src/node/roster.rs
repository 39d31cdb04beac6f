use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::display::{BLUE, GREEN, RED, Rgb, YELLOW};
use crate::grid::GRID_SIZE;
use crate::net::DEFAULT_PORT;
use crate::topology::MOSAIC_SLOTS;

use super::NodeId;

const DEFAULT_COLORS: [Rgb; MOSAIC_SLOTS] = [RED, GREEN, BLUE, YELLOW];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: NodeId,
    pub addr: SocketAddr,
    pub color: Rgb,
    pub cursor_size: i32,
    pub move_step: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("roster is empty")]
    Empty,
    #[error("roster has {0} nodes, the mosaic holds at most 4")]
    TooManyNodes(usize),
    #[error("node id {0} appears more than once")]
    DuplicateId(NodeId),
    #[error("node {0} is not in the roster")]
    UnknownNode(NodeId),
    #[error("node {id} has cursor size {size} and step {step}")]
    InvalidGeometry { id: NodeId, size: i32, step: i32 },
}

/// The fixed set of nodes taking part in one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    nodes: Vec<NodeSpec>,
    hunter: NodeId,
}

impl Roster {
    pub fn new(nodes: Vec<NodeSpec>, hunter: NodeId) -> Result<Self, RosterError> {
        if nodes.is_empty() {
            return Err(RosterError::Empty);
        }
        if nodes.len() > MOSAIC_SLOTS {
            return Err(RosterError::TooManyNodes(nodes.len()));
        }

        let mut seen = BTreeSet::new();
        for spec in &nodes {
            if !seen.insert(spec.id) {
                return Err(RosterError::DuplicateId(spec.id));
            }
            if spec.cursor_size < 1 || spec.cursor_size > GRID_SIZE || spec.move_step < 1 {
                return Err(RosterError::InvalidGeometry {
                    id: spec.id,
                    size: spec.cursor_size,
                    step: spec.move_step,
                });
            }
        }
        if !seen.contains(&hunter) {
            return Err(RosterError::UnknownNode(hunter));
        }

        Ok(Self { nodes, hunter })
    }

    /// Up to four nodes with the hunter (id 0) carrying the larger, faster cursor.
    pub fn from_addresses(addrs: &[SocketAddr]) -> Result<Self, RosterError> {
        Self::new(default_specs(addrs), 0)
    }

    /// The 192.168.10.x deployment.
    pub fn lan_default() -> Self {
        let addrs: Vec<SocketAddr> = (1..=MOSAIC_SLOTS as u8)
            .map(|host| SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 10, host)), DEFAULT_PORT))
            .collect();
        Self {
            nodes: default_specs(&addrs),
            hunter: 0,
        }
    }

    /// Four nodes on one host, one port each starting at `base_port`.
    pub fn localhost(base_port: u16) -> Self {
        let addrs: Vec<SocketAddr> = (0..MOSAIC_SLOTS as u16)
            .map(|offset| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), base_port + offset))
            .collect();
        Self {
            nodes: default_specs(&addrs),
            hunter: 0,
        }
    }

    pub fn nodes(&self) -> &[NodeSpec] {
        &self.nodes
    }

    pub fn hunter(&self) -> NodeId {
        self.hunter
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeSpec> {
        self.nodes.iter().find(|spec| spec.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }
}

fn default_specs(addrs: &[SocketAddr]) -> Vec<NodeSpec> {
    addrs
        .iter()
        .enumerate()
        .map(|(index, &addr)| {
            let id = index as NodeId;
            let (cursor_size, move_step) = if id == 0 { (2, 2) } else { (1, 1) };
            NodeSpec {
                id,
                addr,
                color: DEFAULT_COLORS[index % MOSAIC_SLOTS],
                cursor_size,
                move_step,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lan_default_matches_deployment() {
        let roster = Roster::lan_default();

        assert_eq!(roster.nodes().len(), 4);
        assert_eq!(roster.hunter(), 0);
        let hunter = roster.get(0).unwrap();
        assert_eq!(hunter.addr, "192.168.10.1:5005".parse::<SocketAddr>().unwrap());
        assert_eq!((hunter.cursor_size, hunter.move_step), (2, 2));
        assert_eq!(roster.get(3).unwrap().color, YELLOW);
    }

    #[test]
    fn test_rejects_bad_rosters() {
        assert_eq!(Roster::from_addresses(&[]), Err(RosterError::Empty));

        let addr: SocketAddr = "127.0.0.1:5005".parse().unwrap();
        assert_eq!(
            Roster::from_addresses(&[addr; 5]),
            Err(RosterError::TooManyNodes(5))
        );

        let spec = NodeSpec {
            id: 1,
            addr,
            color: GREEN,
            cursor_size: 1,
            move_step: 1,
        };
        assert_eq!(
            Roster::new(vec![spec.clone()], 0),
            Err(RosterError::UnknownNode(0))
        );
        assert_eq!(
            Roster::new(vec![spec.clone(), spec], 1),
            Err(RosterError::DuplicateId(1))
        );
    }
}
