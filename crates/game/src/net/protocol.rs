use std::fmt;
use std::str::FromStr;

use crate::grid::Direction;
use crate::node::NodeId;

pub const MAX_PACKET_SIZE: usize = 1024;
pub const DEFAULT_PORT: u16 = 5005;
pub const DEFAULT_SPECTATOR_PORT: u16 = 12345;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Move {
        direction: Direction,
        cursor: NodeId,
    },
    Draw {
        x: i32,
        y: i32,
        owner: NodeId,
        cursor: NodeId,
    },
    Cross {
        next: NodeId,
        x: i32,
        y: i32,
        cursor: NodeId,
    },
    Shuffle {
        layout: Vec<NodeId>,
    },
    Catch {
        caught: Vec<NodeId>,
    },
    Check {
        x: i32,
        y: i32,
        owner: NodeId,
        cursor: NodeId,
    },
    Purple {
        node: NodeId,
        x: i32,
        y: i32,
    },
    Boost {
        cursor: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("datagram is not valid utf-8")]
    Encoding,
    #[error("empty datagram")]
    Empty,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects {expected} fields, got {actual}")]
    FieldCount {
        command: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid {field} {value:?}")]
    InvalidField { field: &'static str, value: String },
}

impl Message {
    pub fn command(&self) -> &'static str {
        match self {
            Self::Move { .. } => "MOVE",
            Self::Draw { .. } => "DRAW",
            Self::Cross { .. } => "CROSS",
            Self::Shuffle { .. } => "SHUFFLE",
            Self::Catch { .. } => "CATCH",
            Self::Check { .. } => "CHECK",
            Self::Purple { .. } => "PURPLE",
            Self::Boost { .. } => "BOOST",
        }
    }

    /// Messages dropped while a topology lock is open.
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            Self::Move { .. } | Self::Draw { .. } | Self::Cross { .. }
        )
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        std::str::from_utf8(data)
            .map_err(|_| ProtocolError::Encoding)?
            .parse()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { direction, cursor } => write!(f, "MOVE {} {}", direction, cursor),
            Self::Draw {
                x,
                y,
                owner,
                cursor,
            } => write!(f, "DRAW {} {} {} {}", x, y, owner, cursor),
            Self::Cross { next, x, y, cursor } => {
                write!(f, "CROSS {} {} {} {}", next, x, y, cursor)
            }
            Self::Shuffle { layout } => {
                let ids: Vec<String> = layout.iter().map(|id| id.to_string()).collect();
                write!(f, "SHUFFLE {}", ids.join(","))
            }
            Self::Catch { caught } => {
                write!(f, "CATCH {}", caught.len())?;
                for id in caught {
                    write!(f, " {}", id)?;
                }
                Ok(())
            }
            Self::Check {
                x,
                y,
                owner,
                cursor,
            } => write!(f, "CHECK {} {} {} {}", x, y, owner, cursor),
            Self::Purple { node, x, y } => write!(f, "PURPLE {} {} {}", node, x, y),
            Self::Boost { cursor } => write!(f, "BOOST {}", cursor),
        }
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = parts.next().ok_or(ProtocolError::Empty)?;
        let fields: Vec<&str> = parts.collect();

        match command {
            "MOVE" => {
                expect_fields("MOVE", &fields, 2)?;
                let direction = fields[0]
                    .parse()
                    .map_err(|_| invalid("direction", fields[0]))?;
                Ok(Self::Move {
                    direction,
                    cursor: parse_field("cursor", fields[1])?,
                })
            }
            "DRAW" => {
                expect_fields("DRAW", &fields, 4)?;
                Ok(Self::Draw {
                    x: parse_field("x", fields[0])?,
                    y: parse_field("y", fields[1])?,
                    owner: parse_field("owner", fields[2])?,
                    cursor: parse_field("cursor", fields[3])?,
                })
            }
            "CROSS" => {
                expect_fields("CROSS", &fields, 4)?;
                Ok(Self::Cross {
                    next: parse_field("next", fields[0])?,
                    x: parse_field("x", fields[1])?,
                    y: parse_field("y", fields[2])?,
                    cursor: parse_field("cursor", fields[3])?,
                })
            }
            "SHUFFLE" => {
                expect_fields("SHUFFLE", &fields, 1)?;
                let layout = fields[0]
                    .split(',')
                    .map(|id| parse_field("layout", id))
                    .collect::<Result<Vec<NodeId>, _>>()?;
                Ok(Self::Shuffle { layout })
            }
            "CATCH" => {
                let count: usize = parse_field("count", fields.first().copied().unwrap_or(""))?;
                let ids = &fields[1..];
                expect_fields("CATCH", ids, count)?;
                let caught = ids
                    .iter()
                    .map(|id| parse_field("caught", id))
                    .collect::<Result<Vec<NodeId>, _>>()?;
                Ok(Self::Catch { caught })
            }
            "CHECK" => {
                expect_fields("CHECK", &fields, 4)?;
                Ok(Self::Check {
                    x: parse_field("x", fields[0])?,
                    y: parse_field("y", fields[1])?,
                    owner: parse_field("owner", fields[2])?,
                    cursor: parse_field("cursor", fields[3])?,
                })
            }
            "PURPLE" => {
                expect_fields("PURPLE", &fields, 3)?;
                Ok(Self::Purple {
                    node: parse_field("node", fields[0])?,
                    x: parse_field("x", fields[1])?,
                    y: parse_field("y", fields[2])?,
                })
            }
            "BOOST" => {
                expect_fields("BOOST", &fields, 1)?;
                Ok(Self::Boost {
                    cursor: parse_field("cursor", fields[0])?,
                })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

fn expect_fields(
    command: &'static str,
    fields: &[&str],
    expected: usize,
) -> Result<(), ProtocolError> {
    if fields.len() != expected {
        return Err(ProtocolError::FieldCount {
            command,
            expected,
            actual: fields.len(),
        });
    }
    Ok(())
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> ProtocolError {
    ProtocolError::InvalidField {
        field,
        value: value.to_string(),
    }
}
