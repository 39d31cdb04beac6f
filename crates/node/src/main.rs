mod config;
mod input;
mod tui;

use std::io::{self, Stdout};
use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Runtime;

use config::NodeConfig;
use input::{Autopilot, IdleInput, KeyboardInput};
use mosaic::{
    Direction, EventSink, FeedEvent, Game, Input, Matrix, NodeEndpoint, NodeId, NullFeed, Roster,
    Scheduler, SharedMatrix, UdpFeed,
};
use tui::{Dashboard, View};

#[derive(Parser)]
#[command(name = "mosaic-node")]
#[command(about = "One board of the 2x2 LED mosaic chase game")]
struct Args {
    #[arg(short, long, default_value_t = 0, help = "This node's id; 0 is the hunter")]
    id: NodeId,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Node addresses in id order, replacing the 192.168.10.x roster"
    )]
    peers: Vec<SocketAddr>,

    #[arg(short, long, help = "Local UDP port (defaults to this node's roster port)")]
    port: Option<u16>,

    #[arg(long, default_value = "127.0.0.1:12345", help = "Spectator feed target")]
    spectator: SocketAddr,

    #[arg(long)]
    no_spectator: bool,

    #[arg(long, default_value_t = 180)]
    game_secs: u64,

    #[arg(long, default_value_t = 200)]
    tick_ms: u64,

    #[arg(long)]
    headless: bool,

    #[arg(long, help = "Drive the cursor with a random walk")]
    autopilot: bool,
}

fn build_config(args: &Args) -> Result<NodeConfig> {
    let roster = if args.peers.is_empty() {
        Roster::lan_default()
    } else {
        Roster::from_addresses(&args.peers).context("invalid --peers")?
    };

    let Some(spec) = roster.get(args.id) else {
        bail!("node {} is not in the roster", args.id);
    };
    let port = args.port.unwrap_or(spec.addr.port());

    let mut config = NodeConfig {
        id: args.id,
        bind: SocketAddr::from(([0, 0, 0, 0], port)),
        spectator: (!args.no_spectator).then_some(args.spectator),
        autopilot: args.autopilot,
        roster,
        ..Default::default()
    };
    config.game.game_duration = Duration::from_secs(args.game_secs);
    config.game.tick_interval = Duration::from_millis(args.tick_ms.max(1));
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;
    let runtime = Runtime::new().context("failed to start runtime")?;

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        run_headless(&runtime, config)
    } else {
        run_with_tui(&runtime, config)
    }
}

fn spectator_feed(config: &NodeConfig) -> Box<dyn EventSink> {
    let Some(target) = config.spectator else {
        return Box::new(NullFeed);
    };
    match UdpFeed::new(target) {
        Ok(feed) => Box::new(feed),
        Err(e) => {
            log::warn!("Spectator feed to {} unavailable: {}", target, e);
            Box::new(NullFeed)
        }
    }
}

fn run_headless(runtime: &Runtime, config: NodeConfig) -> Result<()> {
    let game = Game::new(config.id, &config.roster, config.game.clone(), Matrix::new())?;
    let endpoint = runtime
        .block_on(NodeEndpoint::bind(config.bind))
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let input: Box<dyn Input> = if config.autopilot {
        Box::new(Autopilot::new())
    } else {
        Box::new(IdleInput)
    };
    let sink = spectator_feed(&config);

    let scheduler = Scheduler::new(game, endpoint);
    let shutdown = scheduler.shutdown_token();
    let phase = runtime.block_on(async move {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Interrupted, shutting down");
                shutdown.cancel();
            }
        });
        scheduler.run(input, sink).await
    });

    log::info!("Game over for node {}: {}", config.id, phase.as_str());
    Ok(())
}

/// Forwards events to the spectator and copies them to the dashboard log.
struct DashboardFeed {
    inner: Box<dyn EventSink>,
    log: Sender<FeedEvent>,
}

impl EventSink for DashboardFeed {
    fn publish(&mut self, event: &FeedEvent) {
        self.inner.publish(event);
        if !matches!(event, FeedEvent::Matrix { .. }) {
            let _ = self.log.send(event.clone());
        }
    }
}

fn run_with_tui(runtime: &Runtime, config: NodeConfig) -> Result<()> {
    let matrix = SharedMatrix::new();
    let game = Game::new(config.id, &config.roster, config.game.clone(), matrix.clone())?;
    let endpoint = runtime
        .block_on(NodeEndpoint::bind(config.bind))
        .with_context(|| format!("failed to bind {}", config.bind))?;

    let scheduler = Scheduler::new(game, endpoint);
    let shared_game = scheduler.game();
    let endpoint = scheduler.endpoint();
    let shutdown = scheduler.shutdown_token();

    let keys = KeyboardInput::new();
    let input: Box<dyn Input> = if config.autopilot {
        Box::new(Autopilot::new())
    } else {
        Box::new(keys.clone())
    };
    let (log_tx, log_rx) = mpsc::channel();
    let sink = DashboardFeed {
        inner: spectator_feed(&config),
        log: log_tx,
    };
    let worker = runtime.spawn(async move { scheduler.run(input, sink).await });

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut dashboard = Dashboard::new();
    dashboard.log_info(format!(
        "Node {} listening on {}",
        config.id,
        endpoint.local_addr()
    ));
    if let Some(spec) = config.roster.get(config.id) {
        dashboard.log_info(format!("Playing {}", tui::describe_cursor(spec.id, spec.color)));
    }
    if let Some(target) = config.spectator {
        dashboard.log_info(format!("Spectator feed to {}", target));
    }

    let screen = Screen {
        game: shared_game,
        matrix,
        endpoint,
        game_duration: config.game.game_duration,
    };
    let result = dashboard_loop(&mut terminal, &mut dashboard, &screen, &keys, &log_rx);

    shutdown.cancel();
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    let phase = runtime.block_on(worker)?;
    println!("Node {} finished: {}", config.id, phase.as_str());
    result.map_err(Into::into)
}

/// Everything the dashboard reads back from the running node.
struct Screen {
    game: Arc<Mutex<Game<SharedMatrix>>>,
    matrix: SharedMatrix,
    endpoint: Arc<NodeEndpoint>,
    game_duration: Duration,
}

impl Screen {
    fn draw(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
        dashboard: &Dashboard,
    ) -> io::Result<()> {
        let snapshot = self
            .game
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot(Instant::now());
        let matrix = self.matrix.snapshot();
        let stats = self.endpoint.stats();
        let remaining = self.game_duration.saturating_sub(dashboard.elapsed());

        terminal.draw(|frame| {
            tui::render(
                frame,
                dashboard,
                &View {
                    matrix: &matrix,
                    game: &snapshot,
                    stats: &stats,
                    remaining,
                },
            );
        })?;
        Ok(())
    }
}

fn dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    dashboard: &mut Dashboard,
    screen: &Screen,
    keys: &KeyboardInput,
    log_rx: &Receiver<FeedEvent>,
) -> io::Result<()> {
    loop {
        for event in log_rx.try_iter() {
            match event {
                FeedEvent::Catch { target } => dashboard.log_warn(format!("{} was caught", target)),
                FeedEvent::Escaped { target } => {
                    dashboard.log_info(format!("{} escaped", target))
                }
                FeedEvent::Win => dashboard.log_info("Hunter caught everyone"),
                FeedEvent::Lose => dashboard.log_warn("Time up, the runners escaped"),
                FeedEvent::StartTimer { duration } => {
                    dashboard.log_info(format!("Game timer started: {}s", duration))
                }
                FeedEvent::Matrix { .. } => {}
            }
        }

        screen.draw(terminal, dashboard)?;

        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Up => keys.press_direction(Direction::Up),
                        KeyCode::Right => keys.press_direction(Direction::Right),
                        KeyCode::Down => keys.press_direction(Direction::Down),
                        KeyCode::Left => keys.press_direction(Direction::Left),
                        KeyCode::Char(' ') => keys.press_shuffle(),
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(())
}
