use std::collections::BTreeMap;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::display::Display;
use crate::net::Message;
use crate::node::NodeId;

use super::Game;

/// Digit each node shows after a shuffle to `layout`.
///
/// Seeded with the sum of the layout, so every node derives the same
/// mapping, and the mapping is a permutation of the layout's ids.
pub fn shuffle_digits(layout: &[NodeId]) -> BTreeMap<NodeId, NodeId> {
    let mut digits = layout.to_vec();
    digits.sort_unstable();
    let seed: u64 = layout.iter().map(|&id| u64::from(id)).sum();
    digits.shuffle(&mut StdRng::seed_from_u64(seed));

    layout.iter().copied().zip(digits).collect()
}

impl<D: Display> Game<D> {
    /// Reorders the mosaic at random and tells every other node.
    pub fn trigger_shuffle(&mut self, now: Instant) -> bool {
        let current = self.registry.layout().slots().to_vec();
        if current.len() <= 1 {
            return false;
        }

        let mut order = current.clone();
        while order == current {
            order.shuffle(&mut self.rng);
        }

        log::info!("Shuffling layout to {:?}", order);
        let others: Vec<NodeId> = self.registry.ids().filter(|&id| id != self.me).collect();
        for id in others {
            self.send(
                id,
                Message::Shuffle {
                    layout: order.clone(),
                },
            );
        }
        self.apply_shuffle(&order, now);
        true
    }

    pub(crate) fn apply_shuffle(&mut self, order: &[NodeId], now: Instant) {
        self.registry.set_layout(order);
        self.lock_until = Some(now + self.config.topology_lock);

        let layout = self.registry.layout().slots().to_vec();
        let digit = shuffle_digits(&layout)
            .get(&self.me)
            .copied()
            .unwrap_or(self.me);
        log::info!(
            "Layout {} installed, adjacency {}, showing {}",
            self.registry.layout(),
            self.registry.adjacency(self.me),
            digit
        );

        self.show_digit(digit);
        self.redraw();
    }
}
