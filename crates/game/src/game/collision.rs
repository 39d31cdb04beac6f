use glam::IVec2;

use crate::display::{CLEAR, Display, PURPLE};
use crate::grid::square_cells;
use crate::net::Message;
use crate::node::NodeId;

use super::Game;

impl<D: Display> Game<D> {
    /// Cursors rendered here that cover `cell`, lowest id first.
    pub fn occupants(&self, cell: IVec2) -> Vec<NodeId> {
        self.registry
            .nodes()
            .filter(|node| node.is_present() && node.cursor.covers(cell))
            .map(|node| node.id)
            .collect()
    }

    /// Repaints the square `id` vacates at `origin` from whatever remains.
    pub(crate) fn leave(&mut self, id: NodeId, origin: IVec2) {
        let Some(cursor) = self.registry.cursor(id) else {
            return;
        };
        for cell in square_cells(origin, cursor.size) {
            self.repaint(cell, Some(id));
        }
    }

    /// Installs `id` at `origin` on this node, repaints it, then settles
    /// captures and power-up pickup for the move.
    pub(crate) fn enter(&mut self, id: NodeId, origin: IVec2) {
        let Some(cursor) = self.registry.cursor(id) else {
            return;
        };
        self.registry.place(id, origin, true);
        for cell in square_cells(origin, cursor.size) {
            self.repaint(cell, None);
        }

        let contacts = self.contacts(id, origin);
        self.resolve_capture(id, &contacts);
        self.collect_power_up(id);
    }

    pub(crate) fn repaint(&mut self, cell: IVec2, excluding: Option<NodeId>) {
        let top = self
            .occupants(cell)
            .into_iter()
            .find(|&id| Some(id) != excluding);

        let color = match top.and_then(|id| self.registry.get(id)) {
            Some(node) => node.color,
            None if self.power_up_at(cell) => PURPLE,
            None => CLEAR,
        };
        self.display.set_pixel(cell.x, cell.y, color);
    }

    /// `id` plus every cursor here covering the cell it entered.
    fn contacts(&self, id: NodeId, target: IVec2) -> Vec<NodeId> {
        let mut contacts = self.occupants(target);
        if !contacts.contains(&id) {
            contacts.push(id);
        }
        contacts
    }

    fn resolve_capture(&mut self, mover: NodeId, contacts: &[NodeId]) {
        let hunter = self.hunter;
        let caught: Vec<NodeId> = if mover != hunter {
            if contacts.contains(&hunter) {
                vec![mover]
            } else {
                Vec::new()
            }
        } else {
            contacts.iter().copied().filter(|&id| id != hunter).collect()
        };

        if caught.is_empty() {
            return;
        }

        log::info!("Cursor {} made contact, catching {:?}", mover, caught);
        self.broadcast_alive(Message::Catch { caught });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{RED, YELLOW};
    use crate::game::tests::game;

    #[test]
    fn test_lower_id_drawn_on_top() {
        let mut game = game(3);

        game.enter(0, IVec2::new(2, 2));
        assert_eq!(game.display().pixel(2, 2), Some(RED));
        assert_eq!(game.occupants(IVec2::new(2, 2)), vec![0, 3]);

        game.leave(0, IVec2::new(2, 2));
        assert_eq!(game.display().pixel(2, 2), Some(YELLOW));
        assert_eq!(game.display().pixel(3, 3), Some(CLEAR));
    }

    #[test]
    fn test_leave_restores_remaining_occupant() {
        let mut game = game(2);
        game.enter(3, IVec2::new(2, 2));

        game.leave(2, IVec2::new(2, 2));
        game.registry.set_present(2, false);

        assert_eq!(game.display().pixel(2, 2), Some(YELLOW));
    }

    #[test]
    fn test_hunter_entering_catches_every_runner_on_the_cell_once() {
        let mut game = game(1);
        game.enter(2, IVec2::new(2, 2));
        game.enter(3, IVec2::new(3, 3));
        assert!(game.drain_outbox().is_empty());

        game.enter(0, IVec2::new(2, 2));

        let outbox = game.drain_outbox();
        let catches: Vec<&Message> = outbox
            .iter()
            .filter(|out| out.to == 1)
            .map(|out| &out.message)
            .collect();
        assert_eq!(catches, vec![&Message::Catch { caught: vec![1, 2] }]);
        assert_eq!(outbox.len(), 4);
    }

    #[test]
    fn test_hunter_square_alone_does_not_catch() {
        let mut game = game(1);
        game.leave(1, IVec2::new(2, 2));
        game.registry.set_present(1, false);
        game.enter(2, IVec2::new(3, 3));
        assert!(game.drain_outbox().is_empty());

        game.enter(0, IVec2::new(2, 2));

        assert_eq!(game.occupants(IVec2::new(3, 3)), vec![0, 2]);
        assert!(game.drain_outbox().is_empty());
        assert!(game.registry().is_alive(2));
    }

    #[test]
    fn test_runner_walking_into_hunter_is_caught() {
        let mut game = game(2);
        game.enter(0, IVec2::new(4, 4));
        game.drain_outbox();

        game.enter(2, IVec2::new(5, 5));

        let outbox = game.drain_outbox();
        assert!(!outbox.is_empty());
        assert!(outbox
            .iter()
            .all(|out| out.message == Message::Catch { caught: vec![2] }));
    }

    #[test]
    fn test_runners_sharing_a_cell_do_not_catch() {
        let mut game = game(2);
        game.enter(3, IVec2::new(2, 2));
        assert!(game.drain_outbox().is_empty());
    }
}
