use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Serialize};

pub const GRID_SIZE: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    pub fn delta(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::NEG_Y,
            Direction::Right => IVec2::X,
            Direction::Down => IVec2::Y,
            Direction::Left => IVec2::NEG_X,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction {0:?}")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "right" => Ok(Direction::Right),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Largest coordinate a square of `size` may occupy on either axis.
#[inline]
pub fn max_origin(size: i32) -> i32 {
    GRID_SIZE - size
}

#[inline]
pub fn in_grid(cell: IVec2) -> bool {
    (0..GRID_SIZE).contains(&cell.x) && (0..GRID_SIZE).contains(&cell.y)
}

#[inline]
pub fn covers(origin: IVec2, size: i32, cell: IVec2) -> bool {
    origin.x <= cell.x
        && cell.x < origin.x + size
        && origin.y <= cell.y
        && cell.y < origin.y + size
}

pub fn square_cells(origin: IVec2, size: i32) -> impl Iterator<Item = IVec2> {
    (0..size)
        .flat_map(move |dy| (0..size).map(move |dx| origin + IVec2::new(dx, dy)))
        .filter(|cell| in_grid(*cell))
}
