mod capture;
mod collision;
mod dispatch;
mod ownership;
mod powerup;
mod shuffle;

pub use capture::{Teleport, teleport_plan};
pub use powerup::PowerUp;
pub use shuffle::shuffle_digits;

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::Instant;

use glam::IVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::GameConfig;
use crate::display::{Display, RED, WHITE, YELLOW};
use crate::event::FeedEvent;
use crate::grid::{Direction, GRID_SIZE};
use crate::net::Message;
use crate::node::{NodeId, NodeRegistry, Roster, RosterError};
use crate::topology::Adjacency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Caught,
    Won,
    TimeUp,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Playing => "playing",
            Phase::Caught => "caught",
            Phase::Won => "won",
            Phase::TimeUp => "time up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: NodeId,
    pub message: Message,
}

/// One input-loop sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub direction: Option<Direction>,
    pub shuffle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub me: NodeId,
    pub hunter: NodeId,
    pub phase: Phase,
    pub layout: Vec<NodeId>,
    pub adjacency: Adjacency,
    pub alive: Vec<NodeId>,
    pub present: Vec<(NodeId, IVec2)>,
    pub locator: NodeId,
    pub locked: bool,
    pub boosted: Vec<NodeId>,
    pub power_up: Option<PowerUp>,
}

/// All mutable state of one node.
///
/// Every worker goes through this type. Methods that need to talk to other
/// nodes queue [`Outbound`] messages which the caller drains and sends once
/// it no longer holds the game.
pub struct Game<D: Display> {
    me: NodeId,
    hunter: NodeId,
    config: GameConfig,
    registry: NodeRegistry,
    locator: NodeId,
    power_up: Option<PowerUp>,
    boosts: HashMap<NodeId, Instant>,
    lock_until: Option<Instant>,
    phase: Phase,
    display: D,
    rng: StdRng,
    outbox: Vec<Outbound>,
    events: VecDeque<FeedEvent>,
}

impl<D: Display> Game<D> {
    pub fn new(
        me: NodeId,
        roster: &Roster,
        config: GameConfig,
        display: D,
    ) -> Result<Self, RosterError> {
        if !roster.contains(me) {
            return Err(RosterError::UnknownNode(me));
        }

        let mut registry = NodeRegistry::new(roster, config.start_position);
        registry.set_present(me, true);

        let mut game = Self {
            me,
            hunter: roster.hunter(),
            registry,
            locator: me,
            power_up: None,
            boosts: HashMap::new(),
            lock_until: None,
            phase: Phase::Playing,
            display,
            rng: StdRng::from_os_rng(),
            outbox: Vec::new(),
            events: VecDeque::new(),
            config,
        };

        game.display.clear();
        game.redraw();
        if game.is_hunter() {
            game.events.push_back(FeedEvent::StartTimer {
                duration: game.config.game_duration.as_secs(),
            });
        }

        log::info!(
            "Node {} ready, layout {}, adjacency {}",
            me,
            game.registry.layout(),
            game.registry.adjacency(me)
        );
        Ok(game)
    }

    /// Replaces the entropy-seeded generator used for shuffles and power-ups.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn me(&self) -> NodeId {
        self.me
    }

    pub fn hunter(&self) -> NodeId {
        self.hunter
    }

    pub fn is_hunter(&self) -> bool {
        self.me == self.hunter
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase != Phase::Playing
    }

    /// Last known holder of this node's own cursor.
    pub fn locator(&self) -> NodeId {
        self.locator
    }

    pub fn is_locked(&self, now: Instant) -> bool {
        self.lock_until.is_some_and(|until| now < until)
    }

    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    /// Drains the outbox with each message resolved to its node's address.
    pub fn drain_addressed(&mut self) -> Vec<(SocketAddr, Message)> {
        let outbox = std::mem::take(&mut self.outbox);
        outbox
            .into_iter()
            .filter_map(|out| match self.registry.addr(out.to) {
                Some(addr) => Some((addr, out.message)),
                None => {
                    log::warn!("No address for node {}, dropping {}", out.to, out.message);
                    None
                }
            })
            .collect()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = FeedEvent> + '_ {
        self.events.drain(..)
    }

    pub fn snapshot(&self, now: Instant) -> GameSnapshot {
        GameSnapshot {
            me: self.me,
            hunter: self.hunter,
            phase: self.phase,
            layout: self.registry.layout().slots().to_vec(),
            adjacency: self.registry.adjacency(self.me),
            alive: self.registry.alive_ids().into_iter().collect(),
            present: self
                .registry
                .present_ids()
                .into_iter()
                .filter_map(|id| self.registry.cursor(id).map(|c| (id, c.position)))
                .collect(),
            locator: self.locator,
            locked: self.is_locked(now),
            boosted: self
                .registry
                .ids()
                .filter(|&id| self.is_boosted(id, now))
                .collect(),
            power_up: self.power_up,
        }
    }

    /// One pass of the input loop.
    pub fn tick(&mut self, now: Instant, sample: Sample, time_up: bool) {
        if self.is_finished() {
            return;
        }

        if time_up {
            self.finish_on_time_up();
            return;
        }

        if self.is_hunter() && self.all_runners_caught() {
            self.phase = Phase::Won;
            self.events.push_back(FeedEvent::Win);
            self.display.show_message("WIN!", RED);
            log::info!("Every runner caught, hunter wins");
            return;
        }

        if self.is_locked(now) {
            return;
        }

        if sample.shuffle {
            self.trigger_shuffle(now);
            return;
        }

        if let Some(direction) = sample.direction {
            self.drive_local(direction, now);
        }
    }

    pub fn all_runners_caught(&self) -> bool {
        let mut runners = self
            .registry
            .nodes()
            .filter(|node| node.id != self.hunter)
            .peekable();
        runners.peek().is_some() && runners.all(|node| !node.alive)
    }

    fn finish_on_time_up(&mut self) {
        self.phase = Phase::TimeUp;
        if self.is_hunter() {
            self.events.push_back(FeedEvent::Lose);
            self.display.show_message("TIME UP", RED);
            log::info!("Time is up, runners escaped the hunter");
        } else if self.registry.is_alive(self.me) {
            self.events
                .push_back(FeedEvent::escaped(self.me, self.hunter));
            self.display.show_message("ESCAPED", YELLOW);
            log::info!("Time is up, node {} escaped", self.me);
        }
    }

    fn send(&mut self, to: NodeId, message: Message) {
        self.outbox.push(Outbound { to, message });
    }

    /// Queues `message` for every node in the roster, this one included.
    fn broadcast(&mut self, message: Message) {
        let ids: Vec<NodeId> = self.registry.ids().collect();
        for id in ids {
            self.send(id, message.clone());
        }
    }

    /// Queues `message` for every alive node, this one included.
    fn broadcast_alive(&mut self, message: Message) {
        for id in self.registry.alive_ids() {
            self.send(id, message.clone());
        }
    }

    /// Repaints the whole grid from the registry.
    fn redraw(&mut self) {
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                self.repaint(IVec2::new(x, y), None);
            }
        }
    }

    fn show_digit(&mut self, digit: NodeId) {
        self.display.show_message(&digit.to_string(), WHITE);
    }
}
