use std::time::Instant;

use crate::display::Display;
use crate::net::Message;

use super::Game;

impl<D: Display> Game<D> {
    /// Applies one decoded datagram.
    pub fn handle(&mut self, message: Message, now: Instant) {
        if self.is_finished() {
            log::debug!("Game over, ignoring {}", message.command());
            return;
        }
        if message.is_movement() && self.is_locked(now) {
            log::debug!("Topology locked, ignoring {}", message);
            return;
        }

        log::debug!("Node {} handling {}", self.me, message);
        match message {
            Message::Move { direction, cursor } => self.receive_move(direction, cursor, now),
            Message::Draw {
                x,
                y,
                owner,
                cursor,
            } => self.receive_draw(x, y, owner, cursor),
            Message::Cross { next, x, y, cursor } => self.receive_cross(next, x, y, cursor),
            Message::Shuffle { layout } => self.apply_shuffle(&layout, now),
            Message::Catch { caught } => self.apply_catch(&caught),
            Message::Check {
                x,
                y,
                owner,
                cursor,
            } => self.receive_check(x, y, owner, cursor),
            Message::Purple { node, x, y } => self.apply_purple(node, x, y),
            Message::Boost { cursor } => self.apply_boost(cursor, now),
        }
    }
}
