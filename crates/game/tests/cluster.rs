use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::{Duration, Instant};

use glam::IVec2;
use mosaic::display::BLUE;
use mosaic::{Direction, FeedEvent, Game, GameConfig, Matrix, Message, NodeId, Phase, Roster, Sample};

struct Cluster {
    nodes: BTreeMap<NodeId, Game<Matrix>>,
    queue: VecDeque<(NodeId, Message)>,
    now: Instant,
}

impl Cluster {
    fn new() -> Self {
        let roster = Roster::localhost(48000);
        let nodes = (0..4)
            .map(|id| {
                let game = Game::new(id, &roster, GameConfig::default(), Matrix::new())
                    .unwrap()
                    .with_seed(u64::from(id) + 11);
                (id, game)
            })
            .collect();

        Self {
            nodes,
            queue: VecDeque::new(),
            now: Instant::now(),
        }
    }

    fn node(&self, id: NodeId) -> &Game<Matrix> {
        &self.nodes[&id]
    }

    fn collect(&mut self) {
        for game in self.nodes.values_mut() {
            for out in game.drain_outbox() {
                self.queue.push_back((out.to, out.message));
            }
        }
    }

    fn settle(&mut self) {
        self.collect();
        while let Some((to, message)) = self.queue.pop_front() {
            let Some(game) = self.nodes.get_mut(&to) else {
                continue;
            };
            game.handle(message, self.now);
            for out in game.drain_outbox() {
                self.queue.push_back((out.to, out.message));
            }
        }
    }

    fn sample(&mut self, id: NodeId, sample: Sample) {
        let now = self.now;
        if let Some(game) = self.nodes.get_mut(&id) {
            game.tick(now, sample, false);
        }
        self.settle();
        self.now += Duration::from_millis(200);
    }

    fn tilt(&mut self, id: NodeId, direction: Direction, times: usize) {
        for _ in 0..times {
            self.sample(
                id,
                Sample {
                    direction: Some(direction),
                    shuffle: false,
                },
            );
        }
    }

    fn holders(&self, cursor: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, game)| game.registry().is_present(cursor))
            .map(|(&id, _)| id)
            .collect()
    }

    fn layouts(&self) -> BTreeSet<Vec<NodeId>> {
        self.nodes
            .values()
            .map(|game| game.registry().layout().slots().to_vec())
            .collect()
    }
}

#[test]
fn test_cursor_is_owned_by_exactly_one_node() {
    let mut cluster = Cluster::new();

    cluster.tilt(1, Direction::Left, 3);
    assert_eq!(cluster.holders(1), vec![0]);
    assert_eq!(cluster.node(1).locator(), 0);
    assert_eq!(
        cluster.node(0).registry().cursor(1).unwrap().position,
        IVec2::new(7, 2)
    );

    cluster.tilt(1, Direction::Left, 1);
    assert_eq!(
        cluster.node(0).registry().cursor(1).unwrap().position,
        IVec2::new(6, 2)
    );

    cluster.tilt(1, Direction::Right, 2);
    assert_eq!(cluster.holders(1), vec![1]);
    assert_eq!(cluster.node(1).locator(), 1);
    assert_eq!(
        cluster.node(1).registry().cursor(1).unwrap().position,
        IVec2::new(0, 2)
    );
    assert_eq!(cluster.node(0).display().lit_count(), 4);
}

#[test]
fn test_foreign_crossing_routes_through_home() {
    let mut cluster = Cluster::new();

    cluster.tilt(2, Direction::Up, 3);
    assert_eq!(cluster.holders(2), vec![0]);

    cluster.tilt(2, Direction::Right, 6);

    assert_eq!(cluster.holders(2), vec![1]);
    assert_eq!(cluster.node(2).locator(), 1);
    assert_eq!(cluster.node(1).display().pixel(0, 7), Some(BLUE));
    for id in 0..4 {
        assert_eq!(cluster.holders(id).len(), 1, "cursor {} holders", id);
    }
}

#[test]
fn test_capture_reaches_every_node() {
    let mut cluster = Cluster::new();

    cluster.tilt(1, Direction::Left, 6);
    assert_eq!(cluster.node(1).phase(), Phase::Playing);

    cluster.tilt(1, Direction::Left, 1);

    assert_eq!(cluster.node(1).phase(), Phase::Caught);
    assert!(cluster.holders(1).is_empty());
    assert_eq!(cluster.layouts(), BTreeSet::from([vec![0, 2, 3]]));
    for game in cluster.nodes.values() {
        assert!(!game.registry().is_alive(1));
    }

    let mut runner = cluster.nodes.remove(&1).unwrap();
    assert!(runner.drain_events().any(|event| event == FeedEvent::catch(1, 0)));
}

#[test]
fn test_hunter_caught_runner_node_teleports_hunter_once() {
    let mut cluster = Cluster::new();

    cluster.tilt(0, Direction::Right, 3);
    assert_eq!(cluster.holders(0), vec![1]);
    assert_eq!(
        cluster.node(1).registry().cursor(0).unwrap().position,
        IVec2::new(0, 2)
    );

    cluster.tilt(0, Direction::Right, 1);

    assert_eq!(cluster.node(1).phase(), Phase::Caught);
    assert!(!cluster.node(0).registry().is_alive(1));

    let holders = cluster.holders(0);
    assert_eq!(holders.len(), 1, "hunter held by {:?}", holders);
    assert_ne!(holders[0], 1);
    assert_eq!(holders[0], cluster.node(0).locator());
    for id in [2, 3] {
        assert_eq!(cluster.holders(id), vec![id]);
    }
}

#[test]
fn test_shuffle_converges_everywhere() {
    let mut cluster = Cluster::new();

    cluster.sample(
        3,
        Sample {
            direction: None,
            shuffle: true,
        },
    );

    let layouts = cluster.layouts();
    assert_eq!(layouts.len(), 1);
    let layout = layouts.into_iter().next().unwrap();
    assert_ne!(layout, vec![0, 1, 2, 3]);

    let digits: BTreeSet<String> = cluster
        .nodes
        .values()
        .filter_map(|game| game.display().banner().map(|banner| banner.text.clone()))
        .collect();
    assert_eq!(
        digits,
        BTreeSet::from(["0", "1", "2", "3"].map(String::from))
    );
}

#[test]
fn test_redelivered_catch_is_harmless() {
    let mut cluster = Cluster::new();
    for id in 0..4 {
        cluster.queue.push_back((id, Message::Catch { caught: vec![3] }));
    }
    cluster.settle();
    let now = cluster.now;
    let before: Vec<_> = cluster
        .nodes
        .values()
        .map(|game| game.snapshot(now))
        .collect();

    for id in 0..4 {
        cluster.queue.push_back((id, Message::Catch { caught: vec![3] }));
    }
    cluster.settle();

    let after: Vec<_> = cluster
        .nodes
        .values()
        .map(|game| game.snapshot(now))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_hunter_wins_after_last_runner() {
    let mut cluster = Cluster::new();
    for id in 0..4 {
        cluster
            .queue
            .push_back((id, Message::Catch { caught: vec![1, 2, 3] }));
    }
    cluster.settle();

    cluster.sample(0, Sample::default());

    let hunter = cluster.nodes.get_mut(&0).unwrap();
    assert_eq!(hunter.phase(), Phase::Won);
    assert!(hunter.drain_events().any(|event| event == FeedEvent::Win));
}
