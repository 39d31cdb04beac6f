use std::time::Duration;

use glam::IVec2;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub tick_interval: Duration,
    pub game_duration: Duration,
    pub power_up_interval: Duration,
    pub boost_duration: Duration,
    pub topology_lock: Duration,
    pub start_position: IVec2,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            game_duration: Duration::from_secs(180),
            power_up_interval: Duration::from_secs(30),
            boost_duration: Duration::from_secs(3),
            topology_lock: Duration::from_secs(5),
            start_position: IVec2::new(2, 2),
        }
    }
}
