//! App state and main loop: input handling, inbound feed frames, and drawing.

use std::{io, time::Duration};

use chrono::Local;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use futures_util::{Stream, StreamExt};
use tracing::info;

use crate::dashboard::Dashboard;
use crate::rate::RateMode;
use crate::ui::{
    alerts::{draw_alert_distribution, draw_alert_log},
    header::{draw_header, FeedStatus},
    net::draw_traffic_chart,
    processes::{draw_top_processes, processes_clamp, processes_handle_key, visible_rows},
};
use crate::ws::{connect, next_frame, Feed, WsStream};

const TICK: Duration = Duration::from_millis(250);

pub struct App {
    pub dashboard: Dashboard,
    status: FeedStatus,

    // Quit flag
    should_quit: bool,

    pub procs_scroll_offset: usize,
    last_procs_area: Option<Rect>,
}

// Root rows: header, charts (traffic | distribution), tables (processes | alert log)
fn layout(area: Rect) -> (Rect, Rect, Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(45),
            Constraint::Min(8),
        ])
        .split(area);
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(rows[1]);
    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[2]);
    (rows[0], charts[0], charts[1], tables[0], tables[1])
}

impl App {
    pub fn new(rate_mode: RateMode) -> Self {
        Self {
            dashboard: Dashboard::new(rate_mode),
            status: FeedStatus::Live,
            should_quit: false,
            procs_scroll_offset: 0,
            last_procs_area: None,
        }
    }

    pub async fn run(&mut self, url: &str, tls_ca: Option<&str>) -> anyhow::Result<()> {
        // Connect before touching the terminal so errors print normally
        let mut ws = connect(url, tls_ca).await?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let mut input = EventStream::new();
        let res = self.event_loop(&mut terminal, &mut ws, &mut input).await;

        // Every step runs even if an earlier one failed
        let restored = first_error([
            disable_raw_mode(),
            execute!(terminal.backend_mut(), LeaveAlternateScreen),
            terminal.show_cursor(),
        ]);
        let _ = ws.close(None).await;

        info!(
            handled = self.dashboard.events_handled,
            dropped = self.dashboard.dropped_frames,
            "dashboard closed"
        );
        res?;
        restored?;
        Ok(())
    }

    async fn event_loop<B, I>(
        &mut self,
        terminal: &mut Terminal<B>,
        ws: &mut WsStream,
        input: &mut I,
    ) -> anyhow::Result<()>
    where
        B: ratatui::backend::Backend,
        I: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut tick = tokio::time::interval(TICK);
        loop {
            let live = self.status == FeedStatus::Live;
            tokio::select! {
                feed = next_frame(ws), if live => self.on_feed(feed),
                ev = input.next() => match ev {
                    Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => self.handle_key(k),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    // Terminal input is gone; nothing can quit us any more
                    None => break,
                },
                _ = tick.tick() => {}
            }
            if self.should_quit {
                break;
            }
            terminal.draw(|f| self.draw(f))?;
        }
        Ok(())
    }

    pub fn on_feed(&mut self, feed: Feed) {
        match feed {
            Feed::Frame(text) => self.dashboard.handle_frame(&text, Local::now()),
            Feed::Skip => {}
            Feed::Closed => self.status = FeedStatus::Closed,
        }
    }

    pub fn handle_key(&mut self, k: crossterm::event::KeyEvent) {
        if matches!(
            k.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) {
            self.should_quit = true;
            return;
        }
        if let Some(p_area) = self.last_procs_area {
            let page = visible_rows(p_area);
            processes_handle_key(&mut self.procs_scroll_offset, k, page);
            processes_clamp(
                &mut self.procs_scroll_offset,
                self.dashboard.processes.len(),
                page,
            );
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let (header, traffic, distribution, procs, log) = layout(f.area());

        draw_header(f, header, &self.dashboard, self.status);
        draw_traffic_chart(f, traffic, &self.dashboard.traffic);
        draw_alert_distribution(f, distribution, &self.dashboard.tally);

        // Cache for input handlers
        self.last_procs_area = Some(procs);
        draw_top_processes(
            f,
            procs,
            &self.dashboard.processes,
            self.procs_scroll_offset,
        );
        draw_alert_log(f, log, &self.dashboard.alerts);
    }
}

fn first_error<const N: usize>(results: [io::Result<()>; N]) -> io::Result<()> {
    results.into_iter().collect()
}

impl Default for App {
    fn default() -> Self {
        Self::new(RateMode::default())
    }
}
