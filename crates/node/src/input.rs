use std::sync::{Arc, Mutex, PoisonError};

use mosaic::{Direction, Input};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

#[derive(Debug, Default)]
struct KeyState {
    tilt: Option<Direction>,
    shuffle: bool,
}

/// Key presses from the dashboard, consumed one per input-loop sample.
#[derive(Debug, Clone, Default)]
pub struct KeyboardInput {
    state: Arc<Mutex<KeyState>>,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_direction(&self, direction: Direction) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tilt = Some(direction);
    }

    pub fn press_shuffle(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shuffle = true;
    }
}

impl Input for KeyboardInput {
    fn read_tilt(&mut self) -> Option<Direction> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tilt
            .take()
    }

    fn shuffle_pressed(&mut self) -> bool {
        std::mem::take(
            &mut self
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .shuffle,
        )
    }
}

/// Random walk that mostly keeps its heading.
#[derive(Debug)]
pub struct Autopilot {
    rng: StdRng,
    heading: Direction,
}

impl Autopilot {
    const TURN_CHANCE: f64 = 0.3;
    const SHUFFLE_CHANCE: f64 = 0.005;

    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            heading: Direction::Right,
        }
    }
}

impl Input for Autopilot {
    fn read_tilt(&mut self) -> Option<Direction> {
        if self.rng.random_bool(Self::TURN_CHANCE) {
            if let Some(&heading) = Direction::ALL.choose(&mut self.rng) {
                self.heading = heading;
            }
        }
        Some(self.heading)
    }

    fn shuffle_pressed(&mut self) -> bool {
        self.rng.random_bool(Self::SHUFFLE_CHANCE)
    }
}

/// A board nobody is holding.
#[derive(Debug, Default)]
pub struct IdleInput;

impl Input for IdleInput {
    fn read_tilt(&mut self) -> Option<Direction> {
        None
    }

    fn shuffle_pressed(&mut self) -> bool {
        false
    }
}
