use std::time::Instant;

use glam::IVec2;

use crate::display::Display;
use crate::grid::{Direction, max_origin};
use crate::movement::next_position;
use crate::net::Message;
use crate::node::NodeId;

use super::Game;

impl<D: Display> Game<D> {
    /// Applies a tilt of this node's own board to its own cursor.
    ///
    /// When the cursor is rendered here it moves directly, otherwise the
    /// move is forwarded to the node last known to hold it.
    pub(crate) fn drive_local(&mut self, direction: Direction, now: Instant) {
        let me = self.me;
        if !self.registry.is_alive(me) {
            return;
        }

        if self.registry.is_present(me) {
            self.move_cursor(me, direction, now);
        } else {
            let locator = self.locator;
            self.send(
                locator,
                Message::Move {
                    direction,
                    cursor: me,
                },
            );
        }
    }

    pub(crate) fn receive_move(&mut self, direction: Direction, cursor: NodeId, now: Instant) {
        if !self.registry.is_present(cursor) {
            log::debug!("MOVE for cursor {} which is not here, dropping", cursor);
            return;
        }
        self.move_cursor(cursor, direction, now);
    }

    /// Moves a cursor rendered on this node one step, handing it to the
    /// neighbor when the step crosses an edge.
    pub(crate) fn move_cursor(&mut self, id: NodeId, direction: Direction, now: Instant) {
        let Some(cursor) = self.registry.cursor(id) else {
            return;
        };
        if !self.registry.is_present(id) {
            return;
        }

        let step = self.effective_step(id, now);
        let adjacency = self.registry.adjacency(self.me);
        let movement = next_position(cursor.position, direction, cursor.size, step, &adjacency);

        if !movement.crossed {
            self.relocate(id, cursor.position, movement.position);
            return;
        }

        match adjacency.toward(direction) {
            None => {}
            Some(target) if target == self.me => {
                self.relocate(id, cursor.position, movement.position);
            }
            Some(target) => self.hand_off(id, cursor.position, movement.position, target),
        }
    }

    fn relocate(&mut self, id: NodeId, from: IVec2, to: IVec2) {
        if from == to {
            return;
        }
        self.leave(id, from);
        self.enter(id, to);
    }

    pub(crate) fn hand_off(&mut self, id: NodeId, from: IVec2, to: IVec2, target: NodeId) {
        if id == self.me {
            self.send(
                target,
                Message::Draw {
                    x: to.x,
                    y: to.y,
                    owner: self.me,
                    cursor: id,
                },
            );
            self.locator = target;
        } else {
            self.send(
                id,
                Message::Cross {
                    next: target,
                    x: to.x,
                    y: to.y,
                    cursor: id,
                },
            );
        }

        log::debug!("Cursor {} leaves node {} for node {}", id, self.me, target);
        self.leave(id, from);
        self.registry.set_present(id, false);
    }

    pub(crate) fn receive_draw(&mut self, x: i32, y: i32, owner: NodeId, cursor: NodeId) {
        if owner != cursor {
            log::debug!("DRAW from owner {} carries cursor {}", owner, cursor);
        }
        self.install(cursor, IVec2::new(x, y));
    }

    /// Home-node side of a foreign handoff.
    pub(crate) fn receive_cross(&mut self, next: NodeId, x: i32, y: i32, cursor: NodeId) {
        if cursor != self.me {
            log::warn!("CROSS for cursor {} reached node {}, dropping", cursor, self.me);
            return;
        }

        let position = IVec2::new(x, y);
        if next == self.me {
            self.locator = self.me;
            self.install(cursor, position);
        } else if self.registry.is_alive(next) {
            self.send(
                next,
                Message::Draw {
                    x,
                    y,
                    owner: self.me,
                    cursor,
                },
            );
            self.locator = next;
        } else {
            log::warn!(
                "CROSS toward dead node {}, keeping cursor {} at home",
                next,
                cursor
            );
            self.locator = self.me;
            self.install(cursor, position);
        }
    }

    pub(crate) fn receive_check(&mut self, x: i32, y: i32, owner: NodeId, cursor: NodeId) {
        log::debug!("CHECK from {} installs cursor {}", owner, cursor);
        if cursor == self.me {
            self.locator = self.me;
        }
        self.install(cursor, IVec2::new(x, y));
    }

    /// Renders `id` at `position` on this node, replacing any previous
    /// rendering of it here.
    fn install(&mut self, id: NodeId, position: IVec2) {
        if !self.registry.is_alive(id) {
            log::debug!("Ignoring install of dead cursor {}", id);
            return;
        }
        if !self.fits(id, position) {
            log::warn!("Cursor {} does not fit at {}, dropping", id, position);
            return;
        }

        if let Some(cursor) = self.registry.cursor(id) {
            if self.registry.is_present(id) {
                self.leave(id, cursor.position);
            }
        }
        self.enter(id, position);
    }

    fn fits(&self, id: NodeId, position: IVec2) -> bool {
        self.registry.cursor(id).is_some_and(|cursor| {
            let limit = max_origin(cursor.size);
            (0..=limit).contains(&position.x) && (0..=limit).contains(&position.y)
        })
    }
}
