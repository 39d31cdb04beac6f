use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::grid::GRID_SIZE;

use super::{CLEAR, Display, Frame, Rgb};

pub const BANNER_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub color: Rgb,
    pub shown_at: Instant,
}

impl Banner {
    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < BANNER_DURATION
    }
}

/// In-memory LED matrix.
#[derive(Debug, Clone)]
pub struct Matrix {
    pixels: Frame,
    banner: Option<Banner>,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl Matrix {
    pub fn new() -> Self {
        Self {
            pixels: [[CLEAR; GRID_SIZE as usize]; GRID_SIZE as usize],
            banner: None,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.pixels.get(y)?.get(x).copied()
    }

    pub fn pixels(&self) -> &Frame {
        &self.pixels
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn lit_count(&self) -> usize {
        self.pixels
            .iter()
            .flatten()
            .filter(|&&color| color != CLEAR)
            .count()
    }
}

impl Display for Matrix {
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if let Some(pixel) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            *pixel = color;
        }
    }

    fn clear(&mut self) {
        self.pixels = [[CLEAR; GRID_SIZE as usize]; GRID_SIZE as usize];
        self.banner = None;
    }

    fn show_message(&mut self, text: &str, color: Rgb) {
        self.banner = Some(Banner {
            text: text.to_string(),
            color,
            shown_at: Instant::now(),
        });
    }

    fn frame(&self) -> Option<Frame> {
        Some(self.pixels)
    }
}

/// A [`Matrix`] shared between the game and whatever presents it.
#[derive(Debug, Clone, Default)]
pub struct SharedMatrix {
    inner: Arc<Mutex<Matrix>>,
}

impl SharedMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Matrix {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Matrix> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Display for SharedMatrix {
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        self.lock().set_pixel(x, y, color);
    }

    fn clear(&mut self) {
        self.lock().clear();
    }

    fn show_message(&mut self, text: &str, color: Rgb) {
        self.lock().show_message(text, color);
    }

    fn frame(&self) -> Option<Frame> {
        self.lock().frame()
    }
}
