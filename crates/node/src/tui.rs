use std::collections::VecDeque;
use std::time::{Duration, Instant};

use mosaic::display::{CLEAR, color_name};
use mosaic::{GRID_SIZE, GameSnapshot, Matrix, NetworkStats, NodeId, Phase};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

const MAX_LOG_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone)]
struct LogLine {
    level: LogLevel,
    at: Duration,
    text: String,
}

pub struct Dashboard {
    started: Instant,
    log: VecDeque<LogLine>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            log: VecDeque::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn log_info(&mut self, text: impl Into<String>) {
        self.push(LogLevel::Info, text.into());
    }

    pub fn log_warn(&mut self, text: impl Into<String>) {
        self.push(LogLevel::Warn, text.into());
    }

    fn push(&mut self, level: LogLevel, text: String) {
        if self.log.len() == MAX_LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(LogLine {
            level,
            at: self.started.elapsed(),
            text,
        });
    }
}

pub struct View<'a> {
    pub matrix: &'a Matrix,
    pub game: &'a GameSnapshot,
    pub stats: &'a NetworkStats,
    pub remaining: Duration,
}

pub fn render(frame: &mut Frame, dashboard: &Dashboard, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(GRID_SIZE as u16 + 3),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], view);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(GRID_SIZE as u16 * 2 + 4),
            Constraint::Min(30),
            Constraint::Length(34),
        ])
        .split(chunks[1]);
    render_matrix(frame, middle[0], view);
    render_topology(frame, middle[1], view.game);
    render_network(frame, middle[2], view.stats);

    render_log(frame, chunks[2], dashboard);
    render_help(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, view: &View) {
    let game = view.game;
    let role = if game.me == game.hunter {
        "hunter".to_string()
    } else {
        format!("runner {}", game.me)
    };
    let title = format!(" Mosaic Node {} - {} ", game.me, role);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = format!(
        "Phase: {}  |  Time left: {}  |  Alive: {:?}",
        game.phase.as_str(),
        format_duration(view.remaining),
        game.alive
    );

    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, area);
}

fn render_matrix(frame: &mut Frame, area: Rect, view: &View) {
    let matrix = view.matrix;
    let finished = view.game.phase != Phase::Playing;
    let block = Block::default()
        .title(" Matrix ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let mut lines: Vec<Line> = matrix
        .pixels()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&color| {
                    if color == CLEAR {
                        Span::styled("· ", Style::default().fg(Color::DarkGray))
                    } else {
                        Span::styled("██", Style::default().fg(rgb(color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    match matrix
        .banner()
        .filter(|banner| finished || banner.is_visible(Instant::now()))
    {
        Some(banner) => lines.push(Line::from(Span::styled(
            banner.text.clone(),
            Style::default()
                .fg(rgb(banner.color))
                .add_modifier(Modifier::BOLD),
        ))),
        None => lines.push(Line::from("")),
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_topology(frame: &mut Frame, area: Rect, game: &GameSnapshot) {
    let block = Block::default()
        .title(" Topology ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let present: Vec<String> = game
        .present
        .iter()
        .map(|(id, position)| format!("{}@({},{})", id, position.x, position.y))
        .collect();
    let power_up = match game.power_up {
        Some(power_up) => format!(
            "node {} at ({},{})",
            power_up.node, power_up.cell.x, power_up.cell.y
        ),
        None => "none".to_string(),
    };

    let lines = vec![
        field("Layout: ", format!("{:?}", game.layout)),
        field("Neighbors: ", game.adjacency.to_string()),
        field("Cursor at: ", format!("node {}", game.locator)),
        field("Here: ", present.join(" ")),
        field("Boosted: ", format!("{:?}", game.boosted)),
        field("Power-up: ", power_up),
        Line::from(vec![
            Span::styled("Lock: ", Style::default().fg(Color::Gray)),
            Span::styled(
                if game.locked { "locked" } else { "open" },
                Style::default().fg(if game.locked {
                    Color::Red
                } else {
                    Color::White
                }),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_network(frame: &mut Frame, area: Rect, stats: &NetworkStats) {
    let block = Block::default()
        .title(" Network ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let lines = vec![
        field(
            "Packets: ",
            format!("{} sent / {} recv", stats.packets_sent, stats.packets_received),
        ),
        field(
            "Bytes: ",
            format!(
                "{} sent / {} recv",
                format_bytes(stats.bytes_sent),
                format_bytes(stats.bytes_received)
            ),
        ),
        Line::from(vec![
            Span::styled("Dropped: ", Style::default().fg(Color::Gray)),
            Span::styled(
                stats.packets_dropped.to_string(),
                Style::default().fg(if stats.packets_dropped > 0 {
                    Color::Red
                } else {
                    Color::White
                }),
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_log(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let block = Block::default()
        .title(" Events ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = dashboard
        .log
        .iter()
        .skip(dashboard.log.len().saturating_sub(visible))
        .map(|line| {
            let color = match line.level {
                LogLevel::Info => Color::White,
                LogLevel::Warn => Color::Yellow,
            };
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", format_duration(line.at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(line.text.clone(), Style::default().fg(color)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new("Arrows tilt  |  Space shuffles  |  'q' or ESC quits")
        .block(block)
        .style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        );

    frame.render_widget(text, area);
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn rgb(color: [u8; 3]) -> Color {
    Color::Rgb(color[0], color[1], color[2])
}

pub fn describe_cursor(id: NodeId, color: [u8; 3]) -> String {
    format!("cursor {} ({})", id, color_name(color))
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
