use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use glam::IVec2;

use crate::display::{Display, RED};
use crate::event::FeedEvent;
use crate::grid::max_origin;
use crate::node::{Cursor, NodeId};

use super::{Game, Phase};

/// Where a surviving cursor goes when the node rendering it is caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teleport {
    pub cursor: NodeId,
    pub node: NodeId,
    pub position: IVec2,
}

/// Assigns each of `cursors` a destination node from `layout` and a
/// step-aligned cell on it.
///
/// The generator is seeded from the caught ids and the resulting layout,
/// so every node evaluating the same catch derives the same plan.
pub fn teleport_plan(
    cursors: &[(NodeId, Cursor)],
    caught: &[NodeId],
    layout: &[NodeId],
) -> Vec<Teleport> {
    if layout.is_empty() {
        return Vec::new();
    }

    let seed = caught
        .iter()
        .chain(std::iter::once(&NodeId::MAX))
        .chain(layout)
        .fold(0u64, |seed, &id| {
            seed.wrapping_mul(31).wrapping_add(u64::from(id) + 1)
        });
    let mut rng = StdRng::seed_from_u64(seed);

    let mut destinations = layout.to_vec();
    destinations.shuffle(&mut rng);

    cursors
        .iter()
        .enumerate()
        .map(|(i, &(id, cursor))| {
            let step = cursor.step.max(1);
            let slots = max_origin(cursor.size) / step;
            let x = rng.random_range(0..=slots) * step;
            let y = rng.random_range(0..=slots) * step;
            Teleport {
                cursor: id,
                node: destinations[i % destinations.len()],
                position: IVec2::new(x, y),
            }
        })
        .collect()
}

impl<D: Display> Game<D> {
    /// Applies an elimination notice. Re-applying the same notice is a no-op.
    pub(crate) fn apply_catch(&mut self, caught: &[NodeId]) {
        let hunter = self.hunter;
        let candidates: Vec<NodeId> = caught
            .iter()
            .copied()
            .filter(|&id| {
                if id == hunter {
                    log::warn!("CATCH names the hunter, ignoring it");
                }
                id != hunter
            })
            .collect();

        let was_present: Vec<(NodeId, IVec2)> = candidates
            .iter()
            .filter_map(|&id| {
                self.registry
                    .get(id)
                    .filter(|node| node.is_present())
                    .map(|node| (id, node.cursor.position))
            })
            .collect();

        let newly = self.registry.eliminate(&candidates);
        if newly.is_empty() {
            return;
        }
        log::info!(
            "Caught {:?}, layout now {}",
            newly,
            self.registry.layout()
        );

        for (id, position) in was_present {
            self.registry.set_present(id, false);
            self.leave(id, position);
        }

        if let Some(power_up) = self.power_up {
            if newly.contains(&power_up.node) {
                self.power_up = None;
            }
        }

        if newly.contains(&self.me) {
            self.teleport_survivors(&newly);
            self.phase = Phase::Caught;
            self.events
                .push_back(FeedEvent::catch(self.me, self.hunter));
            self.display.show_message("CAUGHT!", RED);
            log::info!("Node {} was caught", self.me);
        }
    }

    fn teleport_survivors(&mut self, caught: &[NodeId]) {
        let survivors: Vec<(NodeId, Cursor)> = self
            .registry
            .present_ids()
            .into_iter()
            .filter_map(|id| self.registry.cursor(id).map(|cursor| (id, cursor)))
            .collect();
        let plan = teleport_plan(&survivors, caught, self.registry.layout().slots());

        for teleport in plan {
            let Some(cursor) = self.registry.cursor(teleport.cursor) else {
                continue;
            };
            log::info!(
                "Teleporting cursor {} to node {} at {}",
                teleport.cursor,
                teleport.node,
                teleport.position
            );
            if teleport.node == self.me {
                self.leave(teleport.cursor, cursor.position);
                self.enter(teleport.cursor, teleport.position);
            } else {
                self.hand_off(teleport.cursor, cursor.position, teleport.position, teleport.node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::CLEAR;
    use crate::game::Outbound;
    use crate::game::tests::game;
    use crate::net::Message;

    fn cursor(size: i32, step: i32) -> Cursor {
        Cursor {
            position: IVec2::ZERO,
            size,
            step,
            on_this_node: true,
        }
    }

    #[test]
    fn test_catch_removes_node_from_layout() {
        let mut game = game(0);
        game.apply_catch(&[2]);

        assert_eq!(game.registry().layout().slots(), &[0, 1, 3]);
        assert!(game.registry().nodes().all(|node| !node.adjacency.references(2)));
        assert!(!game.registry().is_alive(2));
    }

    #[test]
    fn test_repeated_catch_changes_nothing() {
        let mut game = game(1);
        game.apply_catch(&[3]);
        let before = game.snapshot(std::time::Instant::now());
        let frame = *game.display().pixels();

        game.apply_catch(&[3]);

        assert_eq!(game.snapshot(std::time::Instant::now()), before);
        assert_eq!(game.display().pixels(), &frame);
        assert!(game.drain_outbox().is_empty());
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_catch_naming_hunter_is_ignored() {
        let mut game = game(2);
        game.apply_catch(&[0]);
        assert!(game.registry().is_alive(0));
        assert_eq!(game.registry().layout().len(), 4);
    }

    #[test]
    fn test_caught_cursor_is_cleared_here() {
        let mut game = game(1);
        game.receive_draw(5, 5, 3, 3);

        game.apply_catch(&[3]);

        assert!(!game.registry().is_present(3));
        assert_eq!(game.display().pixel(5, 5), Some(CLEAR));
    }

    #[test]
    fn test_caught_node_hands_survivors_off() {
        let mut game = game(2);
        game.receive_draw(4, 4, 1, 1);
        game.drain_outbox();

        game.apply_catch(&[2]);

        assert_eq!(game.phase(), Phase::Caught);
        assert_eq!(
            game.drain_events().collect::<Vec<_>>(),
            vec![FeedEvent::catch(2, 0)]
        );
        assert!(!game.registry().is_present(1));
        assert_eq!(game.display().banner().map(|b| b.text.as_str()), Some("CAUGHT!"));

        let outbox = game.drain_outbox();
        assert_eq!(outbox.len(), 1);
        let Outbound {
            to,
            message: Message::Cross { next, cursor, .. },
        } = outbox[0].clone()
        else {
            panic!("expected CROSS, got {:?}", outbox[0]);
        };
        assert_eq!(to, 1);
        assert_eq!(cursor, 1);
        assert!([0, 1, 3].contains(&next));
    }

    #[test]
    fn test_teleport_positions_are_step_aligned() {
        let cursors = [(0, cursor(2, 2)), (1, cursor(1, 1)), (3, cursor(1, 1))];

        for caught in 1..4u8 {
            let layout: Vec<NodeId> = [0, 1, 2, 3].into_iter().filter(|&id| id != caught).collect();
            for (teleport, (_, cursor)) in teleport_plan(&cursors, &[caught], &layout)
                .iter()
                .zip(cursors.iter())
            {
                let limit = max_origin(cursor.size);
                assert_eq!(teleport.position.x % cursor.step, 0);
                assert_eq!(teleport.position.y % cursor.step, 0);
                assert!((0..=limit).contains(&teleport.position.x));
                assert!((0..=limit).contains(&teleport.position.y));
                assert!(layout.contains(&teleport.node));
            }
        }
    }

    #[test]
    fn test_teleport_plan_is_deterministic() {
        let cursors = [(1, cursor(1, 1)), (3, cursor(1, 1))];
        let a = teleport_plan(&cursors, &[2], &[0, 1, 3]);
        let b = teleport_plan(&cursors, &[2], &[0, 1, 3]);

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_ne!(a[0].node, a[1].node);
        assert!(teleport_plan(&cursors, &[2], &[]).is_empty());
    }
}
