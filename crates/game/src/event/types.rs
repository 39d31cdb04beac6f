use serde::Serialize;

use crate::display::Frame;
use crate::node::NodeId;

/// Events published to the spectator process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    StartTimer { duration: u64 },
    Catch { target: String },
    Escaped { target: String },
    Win,
    Lose,
    Matrix { name: String, matrix: Frame },
}

impl FeedEvent {
    pub fn catch(id: NodeId, hunter: NodeId) -> Self {
        Self::Catch {
            target: spectator_name(id, hunter),
        }
    }

    pub fn escaped(id: NodeId, hunter: NodeId) -> Self {
        Self::Escaped {
            target: spectator_name(id, hunter),
        }
    }

    pub fn matrix(id: NodeId, hunter: NodeId, matrix: Frame) -> Self {
        Self::Matrix {
            name: spectator_name(id, hunter),
            matrix,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::StartTimer { .. } => "start_timer",
            Self::Catch { .. } => "catch",
            Self::Escaped { .. } => "escaped",
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Matrix { .. } => "matrix",
        }
    }
}

/// Panel name the spectator uses for a node.
pub fn spectator_name(id: NodeId, hunter: NodeId) -> String {
    if id == hunter {
        "oni".to_string()
    } else {
        format!("play{}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{CLEAR, RED};

    #[test]
    fn test_event_json_shape() {
        let catch = serde_json::to_value(FeedEvent::catch(2, 0)).unwrap();
        assert_eq!(catch, serde_json::json!({"type": "catch", "target": "play2"}));

        let win = serde_json::to_value(FeedEvent::Win).unwrap();
        assert_eq!(win, serde_json::json!({"type": "win"}));

        let timer = serde_json::to_value(FeedEvent::StartTimer { duration: 180 }).unwrap();
        assert_eq!(timer["type"], "start_timer");
        assert_eq!(timer["duration"], 180);
    }

    #[test]
    fn test_matrix_rows_are_rgb_triples() {
        let mut frame = [[CLEAR; 8]; 8];
        frame[1][3] = RED;

        let value = serde_json::to_value(FeedEvent::matrix(0, 0, frame)).unwrap();

        assert_eq!(value["name"], "oni");
        assert_eq!(value["matrix"][1][3], serde_json::json!([255, 0, 0]));
        assert_eq!(value["matrix"].as_array().unwrap().len(), 8);
    }
}
