use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;

use mosaic::{
    Direction, FeedEvent, Game, GameConfig, Input, Matrix, Message, NodeEndpoint, Phase, Roster,
    Scheduler,
};
use tokio::time::timeout;

static PORT_COUNTER: AtomicU16 = AtomicU16::new(41000);

fn next_port() -> u16 {
    PORT_COUNTER.fetch_add(10, Ordering::SeqCst)
}

fn local(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

struct Idle;

impl Input for Idle {
    fn read_tilt(&mut self) -> Option<Direction> {
        None
    }

    fn shuffle_pressed(&mut self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_endpoints_exchange_messages() {
    let port = next_port();
    let a = NodeEndpoint::bind(local(port)).await.unwrap();
    let b = NodeEndpoint::bind(local(port + 1)).await.unwrap();

    let message = Message::Cross {
        next: 3,
        x: 0,
        y: 4,
        cursor: 1,
    };
    a.send_to(&message, b.local_addr()).await.unwrap();

    let (received, from) = timeout(Duration::from_secs(1), b.receive())
        .await
        .expect("no datagram")
        .unwrap();
    assert_eq!(received, message);
    assert_eq!(from, a.local_addr());
    assert_eq!(a.stats().packets_sent, 1);
    assert_eq!(b.stats().packets_received, 1);
}

#[tokio::test]
async fn test_garbage_datagram_is_dropped() {
    let port = next_port();
    let b = NodeEndpoint::bind(local(port)).await.unwrap();
    let raw = tokio::net::UdpSocket::bind(local(port + 1)).await.unwrap();

    raw.send_to(b"HELLO 1 2", b.local_addr()).await.unwrap();
    raw.send_to(b"CATCH 2 1", b.local_addr()).await.unwrap();
    raw.send_to(b"BOOST 2", b.local_addr()).await.unwrap();

    let (received, _) = timeout(Duration::from_secs(1), b.receive())
        .await
        .expect("no datagram")
        .unwrap();
    assert_eq!(received, Message::Boost { cursor: 2 });
    assert_eq!(b.stats().packets_dropped, 2);
    assert_eq!(b.stats().packets_received, 1);
}

#[tokio::test]
async fn test_scheduler_stops_when_time_is_up() {
    let port = next_port();
    let roster = Roster::localhost(port);
    let config = GameConfig {
        tick_interval: Duration::from_millis(10),
        game_duration: Duration::from_millis(100),
        ..GameConfig::default()
    };
    let game = Game::new(2, &roster, config, Matrix::new()).unwrap();
    let endpoint = NodeEndpoint::bind(local(port + 2)).await.unwrap();
    let scheduler = Scheduler::new(game, endpoint);

    let mut events: Vec<FeedEvent> = Vec::new();
    let phase = timeout(Duration::from_secs(2), scheduler.run(Idle, &mut events))
        .await
        .expect("scheduler did not stop");

    assert_eq!(phase, Phase::TimeUp);
    assert!(events.contains(&FeedEvent::escaped(2, 0)));
    assert!(events.iter().any(|event| event.kind() == "matrix"));
}

#[tokio::test]
async fn test_scheduler_applies_remote_catch() {
    let port = next_port();
    let roster = Roster::localhost(port);
    let game = Game::new(1, &roster, GameConfig::default(), Matrix::new()).unwrap();
    let endpoint = NodeEndpoint::bind(local(port + 1)).await.unwrap();
    let scheduler = Scheduler::new(game, endpoint);
    let target = scheduler.endpoint().local_addr();

    let hunter = NodeEndpoint::bind(local(port)).await.unwrap();
    let send = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        hunter
            .send_to(&Message::Catch { caught: vec![1] }, target)
            .await
            .unwrap();
    };

    let mut events: Vec<FeedEvent> = Vec::new();
    let (phase, ()) = timeout(Duration::from_secs(2), async {
        tokio::join!(scheduler.run(Idle, &mut events), send)
    })
    .await
    .expect("scheduler did not stop");

    assert_eq!(phase, Phase::Caught);
    assert!(events.contains(&FeedEvent::catch(1, 0)));
}
