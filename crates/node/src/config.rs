use std::net::SocketAddr;

use mosaic::net::{DEFAULT_PORT, DEFAULT_SPECTATOR_PORT};
use mosaic::{GameConfig, NodeId, Roster};

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub roster: Roster,
    pub bind: SocketAddr,
    pub spectator: Option<SocketAddr>,
    pub game: GameConfig,
    pub autopilot: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            id: 0,
            roster: Roster::lan_default(),
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            spectator: Some(SocketAddr::from(([127, 0, 0, 1], DEFAULT_SPECTATOR_PORT))),
            game: GameConfig::default(),
            autopilot: false,
        }
    }
}
