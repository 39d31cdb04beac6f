mod endpoint;
mod protocol;
mod stats;

pub use endpoint::NodeEndpoint;
pub use protocol::{
    DEFAULT_PORT, DEFAULT_SPECTATOR_PORT, MAX_PACKET_SIZE, Message, ProtocolError,
};
pub use stats::NetworkStats;
