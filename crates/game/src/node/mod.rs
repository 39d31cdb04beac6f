mod registry;
mod roster;

pub use registry::NodeRegistry;
pub use roster::{NodeSpec, Roster, RosterError};

use std::net::SocketAddr;

use glam::IVec2;

use crate::display::Rgb;
use crate::grid::{covers, max_origin};
use crate::topology::Adjacency;

pub type NodeId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub position: IVec2,
    pub size: i32,
    pub step: i32,
    pub on_this_node: bool,
}

impl Cursor {
    pub fn covers(&self, cell: IVec2) -> bool {
        covers(self.position, self.size, cell)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub addr: SocketAddr,
    pub color: Rgb,
    pub alive: bool,
    pub adjacency: Adjacency,
    pub cursor: Cursor,
}

impl Node {
    pub fn from_spec(spec: &NodeSpec, start: IVec2) -> Self {
        Self {
            id: spec.id,
            addr: spec.addr,
            color: spec.color,
            alive: true,
            adjacency: Adjacency::ISOLATED,
            cursor: Cursor {
                position: start.clamp(IVec2::ZERO, IVec2::splat(max_origin(spec.cursor_size))),
                size: spec.cursor_size,
                step: spec.move_step,
                on_this_node: false,
            },
        }
    }

    /// Alive and rendered here.
    pub fn is_present(&self) -> bool {
        self.alive && self.cursor.on_this_node
    }
}
