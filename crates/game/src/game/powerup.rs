use std::time::Instant;

use glam::IVec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::display::Display;
use crate::grid::{GRID_SIZE, in_grid};
use crate::net::Message;
use crate::node::NodeId;

use super::Game;

/// The single purple cell that boosts whoever steps on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub node: NodeId,
    pub cell: IVec2,
}

impl<D: Display> Game<D> {
    pub fn power_up(&self) -> Option<PowerUp> {
        self.power_up
    }

    /// Places a new power-up on a random board of the current layout.
    ///
    /// Only the hunter spawns, and only while no power-up is active.
    pub fn spawn_power_up(&mut self) -> bool {
        if !self.is_hunter() || self.is_finished() || self.power_up.is_some() {
            return false;
        }

        let Some(&node) = self.registry.layout().slots().choose(&mut self.rng) else {
            return false;
        };
        let x = self.rng.random_range(0..GRID_SIZE);
        let y = self.rng.random_range(0..GRID_SIZE);

        log::info!("Spawning power-up on node {} at ({}, {})", node, x, y);
        self.broadcast(Message::Purple { node, x, y });
        true
    }

    pub(crate) fn apply_purple(&mut self, node: NodeId, x: i32, y: i32) {
        let cell = IVec2::new(x, y);
        if !in_grid(cell) || self.registry.get(node).is_none() {
            log::warn!("Ignoring PURPLE for node {} at {}", node, cell);
            return;
        }

        let previous = self.power_up.replace(PowerUp { node, cell });
        if let Some(previous) = previous {
            if previous.node == self.me {
                self.repaint(previous.cell, None);
            }
        }
        if node == self.me {
            self.repaint(cell, None);
        }
    }

    pub(crate) fn apply_boost(&mut self, cursor: NodeId, now: Instant) {
        if self.registry.get(cursor).is_none() {
            return;
        }
        let until = now + self.config.boost_duration;
        self.boosts.insert(cursor, until);
        log::info!("Cursor {} boosted", cursor);

        if let Some(previous) = self.power_up.take() {
            if previous.node == self.me {
                self.repaint(previous.cell, None);
            }
        }
    }

    /// Consumes the power-up if `id` now covers it on this node.
    pub(crate) fn collect_power_up(&mut self, id: NodeId) {
        let Some(power_up) = self.power_up else {
            return;
        };
        if power_up.node != self.me {
            return;
        }
        let Some(cursor) = self.registry.cursor(id) else {
            return;
        };
        if !cursor.covers(power_up.cell) {
            return;
        }

        self.power_up = None;
        log::info!("Cursor {} picked up the power-up", id);
        self.broadcast(Message::Boost { cursor: id });
    }

    pub(crate) fn power_up_at(&self, cell: IVec2) -> bool {
        self.power_up
            .is_some_and(|power_up| power_up.node == self.me && power_up.cell == cell)
    }

    pub fn is_boosted(&self, id: NodeId, now: Instant) -> bool {
        self.boosts.get(&id).is_some_and(|&until| now < until)
    }

    pub(crate) fn effective_step(&self, id: NodeId, now: Instant) -> i32 {
        let step = self.registry.cursor(id).map_or(1, |cursor| cursor.step);
        if self.is_boosted(id, now) { step * 2 } else { step }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::display::{CLEAR, PURPLE};
    use crate::game::tests::game;
    use crate::grid::Direction;

    #[test]
    fn test_only_hunter_spawns_once() {
        let mut runner = game(1);
        assert!(!runner.spawn_power_up());

        let mut hunter = game(0);
        assert!(hunter.spawn_power_up());
        let outbox = hunter.drain_outbox();
        assert_eq!(outbox.len(), 4);
        assert!(matches!(outbox[0].message, Message::Purple { .. }));

        let Message::Purple { node, x, y } = outbox[0].message.clone() else {
            unreachable!();
        };
        hunter.apply_purple(node, x, y);
        assert!(!hunter.spawn_power_up());
    }

    #[test]
    fn test_purple_renders_only_on_its_node() {
        let mut game = game(2);
        game.apply_purple(2, 6, 1);
        assert_eq!(game.display().pixel(6, 1), Some(PURPLE));

        game.apply_purple(3, 0, 0);
        assert_eq!(game.display().pixel(6, 1), Some(CLEAR));
        assert_eq!(game.display().pixel(0, 0), Some(CLEAR));
        assert_eq!(game.power_up().map(|p| p.node), Some(3));
    }

    #[test]
    fn test_stepping_on_power_up_broadcasts_boost() {
        let mut game = game(2);
        game.apply_purple(2, 2, 3);
        game.move_cursor(2, Direction::Down, Instant::now());

        assert_eq!(
            game.drain_outbox()
                .into_iter()
                .map(|out| out.message)
                .collect::<Vec<_>>()
                .first(),
            Some(&Message::Boost { cursor: 2 })
        );
        assert_eq!(game.power_up(), None);
    }

    #[test]
    fn test_boost_doubles_step_until_expiry() {
        let mut game = game(3);
        let now = Instant::now();
        game.apply_purple(3, 7, 7);
        game.apply_boost(3, now);

        assert_eq!(game.power_up(), None);
        assert_eq!(game.display().pixel(7, 7), Some(CLEAR));
        assert!(game.is_boosted(3, now));
        assert_eq!(game.effective_step(3, now), 2);

        let later = now + Duration::from_secs(3);
        assert!(!game.is_boosted(3, later));
        assert_eq!(game.effective_step(3, later), 1);

        game.move_cursor(3, Direction::Right, now + Duration::from_secs(1));
        assert_eq!(game.registry().cursor(3).unwrap().position, IVec2::new(4, 2));
    }

    #[test]
    fn test_purple_off_grid_ignored() {
        let mut game = game(2);
        game.apply_purple(2, 8, 0);
        assert_eq!(game.power_up(), None);
    }
}
