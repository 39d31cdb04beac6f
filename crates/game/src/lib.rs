pub mod config;
pub mod display;
pub mod event;
pub mod game;
pub mod grid;
pub mod movement;
pub mod net;
pub mod node;
pub mod scheduler;
pub mod topology;

pub use config::GameConfig;
pub use display::{Display, Frame, Input, Matrix, Rgb, SharedMatrix};
pub use event::{EventSink, FeedEvent, NullFeed, UdpFeed};
pub use game::{Game, GameSnapshot, Outbound, Phase, PowerUp, Sample};
pub use grid::{Direction, GRID_SIZE};
pub use net::{Message, NetworkStats, NodeEndpoint, ProtocolError};
pub use node::{Cursor, Node, NodeId, NodeRegistry, NodeSpec, Roster, RosterError};
pub use scheduler::Scheduler;
pub use topology::{Adjacency, Layout, compute_adjacency};
