mod matrix;

pub use matrix::{BANNER_DURATION, Banner, Matrix, SharedMatrix};

use crate::grid::{Direction, GRID_SIZE};

pub type Rgb = [u8; 3];

/// One 8x8 frame, indexed `[y][x]`.
pub type Frame = [[Rgb; GRID_SIZE as usize]; GRID_SIZE as usize];

pub const CLEAR: Rgb = [0, 0, 0];
pub const RED: Rgb = [255, 0, 0];
pub const GREEN: Rgb = [0, 255, 0];
pub const BLUE: Rgb = [0, 0, 255];
pub const YELLOW: Rgb = [255, 255, 0];
pub const WHITE: Rgb = [255, 255, 255];
pub const PURPLE: Rgb = [128, 0, 128];

pub fn color_name(color: Rgb) -> &'static str {
    match color {
        RED => "red",
        GREEN => "green",
        BLUE => "blue",
        YELLOW => "yellow",
        WHITE => "white",
        PURPLE => "purple",
        CLEAR => "clear",
        _ => "unknown",
    }
}

/// Pixel output of one node.
pub trait Display {
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb);

    fn clear(&mut self);

    fn show_message(&mut self, text: &str, color: Rgb);

    /// Current frame, for displays that can be read back.
    fn frame(&self) -> Option<Frame> {
        None
    }
}

/// Tilt and button sampling of one node.
pub trait Input: Send {
    fn read_tilt(&mut self) -> Option<Direction>;

    fn shuffle_pressed(&mut self) -> bool;
}

impl<I: Input + ?Sized> Input for Box<I> {
    fn read_tilt(&mut self) -> Option<Direction> {
        (**self).read_tilt()
    }

    fn shuffle_pressed(&mut self) -> bool {
        (**self).shuffle_pressed()
    }
}
