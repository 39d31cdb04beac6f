use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::display::{Display, Frame, Input};
use crate::event::{EventSink, FeedEvent};
use crate::game::{Game, Phase, Sample};
use crate::net::{Message, NodeEndpoint};

/// Runs the listener, input loop, game timer and power-up loop of one node
/// against a shared [`Game`].
pub struct Scheduler<D: Display + Send + 'static> {
    game: Arc<Mutex<Game<D>>>,
    endpoint: Arc<NodeEndpoint>,
    shutdown: CancellationToken,
    time_up: Arc<AtomicBool>,
}

impl<D: Display + Send + 'static> Scheduler<D> {
    pub fn new(game: Game<D>, endpoint: NodeEndpoint) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
            endpoint: Arc::new(endpoint),
            shutdown: CancellationToken::new(),
            time_up: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn game(&self) -> Arc<Mutex<Game<D>>> {
        Arc::clone(&self.game)
    }

    pub fn endpoint(&self) -> Arc<NodeEndpoint> {
        Arc::clone(&self.endpoint)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs until the game ends for this node or the shutdown token fires.
    pub async fn run<I, S>(&self, mut input: I, mut sink: S) -> Phase
    where
        I: Input,
        S: EventSink,
    {
        let (config, is_hunter) = {
            let game = lock(&self.game);
            (game.config().clone(), game.is_hunter())
        };

        let mut workers = vec![
            self.spawn_listener(),
            self.spawn_game_timer(config.game_duration),
        ];
        if is_hunter {
            workers.push(self.spawn_power_up_loop(config.power_up_interval));
        }

        log::info!("Node running on {}", self.endpoint.local_addr());
        self.input_loop(&mut input, &mut sink, config.tick_interval)
            .await;

        self.shutdown.cancel();
        for worker in workers {
            if let Err(e) = worker.await {
                log::warn!("Worker ended abnormally: {}", e);
            }
        }

        let phase = lock(&self.game).phase();
        log::info!("Node stopped, phase {}", phase.as_str());
        phase
    }

    async fn input_loop<I: Input, S: EventSink>(
        &self,
        input: &mut I,
        sink: &mut S,
        tick_interval: Duration,
    ) {
        let mut interval = time::interval(tick_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        let mut last_frame: Option<Frame> = None;

        loop {
            select! {
                _ = interval.tick() => {}
                _ = self.shutdown.cancelled() => break,
            }

            let sample = Sample {
                direction: input.read_tilt(),
                shuffle: input.shuffle_pressed(),
            };
            let time_up = self.time_up.load(Ordering::Acquire);

            let (outgoing, finished) = {
                let mut game = lock(&self.game);
                game.tick(Instant::now(), sample, time_up);
                (game.drain_addressed(), game.is_finished())
            };
            deliver(&self.endpoint, outgoing).await;
            self.publish(sink, &mut last_frame);

            if finished {
                break;
            }
        }

        self.publish(sink, &mut last_frame);
    }

    /// Forwards queued events and, when it changed, the current frame.
    fn publish<S: EventSink>(&self, sink: &mut S, last_frame: &mut Option<Frame>) {
        let (events, frame) = {
            let mut game = lock(&self.game);
            let me = game.me();
            let hunter = game.hunter();
            let frame = game
                .display()
                .frame()
                .filter(|frame| last_frame.as_ref() != Some(frame))
                .map(|frame| (frame, FeedEvent::matrix(me, hunter, frame)));
            (game.drain_events().collect::<Vec<_>>(), frame)
        };

        for event in &events {
            sink.publish(event);
        }
        if let Some((frame, event)) = frame {
            sink.publish(&event);
            *last_frame = Some(frame);
        }
    }

    fn spawn_listener(&self) -> JoinHandle<()> {
        let game = Arc::clone(&self.game);
        let endpoint = Arc::clone(&self.endpoint);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let received = select! {
                    _ = shutdown.cancelled() => break,
                    received = endpoint.receive() => received,
                };

                match received {
                    Ok((message, from)) => {
                        log::debug!("Received {} from {}", message, from);
                        let outgoing = {
                            let mut game = lock(&game);
                            game.handle(message, Instant::now());
                            game.drain_addressed()
                        };
                        deliver(&endpoint, outgoing).await;
                    }
                    Err(e) => log::warn!("Receive failed: {}", e),
                }
            }
        })
    }

    fn spawn_game_timer(&self, duration: Duration) -> JoinHandle<()> {
        let time_up = Arc::clone(&self.time_up);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            select! {
                _ = time::sleep(duration) => {
                    log::info!("Game timer expired after {:?}", duration);
                    time_up.store(true, Ordering::Release);
                }
                _ = shutdown.cancelled() => {}
            }
        })
    }

    fn spawn_power_up_loop(&self, period: Duration) -> JoinHandle<()> {
        let game = Arc::clone(&self.game);
        let endpoint = Arc::clone(&self.endpoint);
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                select! {
                    _ = interval.tick() => {}
                    _ = shutdown.cancelled() => break,
                }

                let outgoing = {
                    let mut game = lock(&game);
                    game.spawn_power_up();
                    game.drain_addressed()
                };
                deliver(&endpoint, outgoing).await;
            }
        })
    }
}

async fn deliver(endpoint: &NodeEndpoint, outgoing: Vec<(SocketAddr, Message)>) {
    for (addr, message) in outgoing {
        if let Err(e) = endpoint.send_to(&message, addr).await {
            log::warn!("Failed to send {} to {}: {}", message, addr, e);
        }
    }
}

fn lock<D: Display>(game: &Mutex<Game<D>>) -> MutexGuard<'_, Game<D>> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}
