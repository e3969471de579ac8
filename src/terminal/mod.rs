// src/terminal/mod.rs

pub mod draw;
pub mod keys;

use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::{Local, Timelike};
use crossterm::{
    cursor::{Hide, Show},
    event::{DisableFocusChange, EnableFocusChange, EventStream},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use tokio::{sync::mpsc::UnboundedReceiver, time};
use tracing::{info, warn};
use url::Url;

use crate::{
    board::Board,
    poller::{PollHandle, TickOutcome},
    settings::{Settings, SettingsStore},
};
use draw::View;
use keys::{command_for, UiCommand, HELP};

const REDRAW_EVERY: Duration = Duration::from_millis(250);

/// Raw mode + alternate screen for as long as it lives.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide, EnableFocusChange)
            .context("entering alternate screen")?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, DisableFocusChange, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Clone, Debug, Default)]
pub struct DisplayOptions {
    pub poll_interval: Duration,
    pub diagnostics: bool,
    /// Treat losing terminal focus like the page being hidden.
    pub pause_on_blur: bool,
    pub source_label: String,
    pub share_link: Option<Url>,
}

/// Settings to update when the user changes something at runtime.
pub struct Persist {
    pub store: SettingsStore,
    pub settings: Settings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The display's mutable state, owned by one loop.
pub struct Session {
    board: Board,
    poller: PollHandle,
    options: DisplayOptions,
    persist: Option<Persist>,
    paused: bool,
    diagnostics: bool,
}

impl Session {
    pub fn new(board: Board, poller: PollHandle, options: DisplayOptions, persist: Option<Persist>) -> Self {
        let diagnostics = options.diagnostics;
        Self {
            board,
            poller,
            options,
            persist,
            paused: false,
            diagnostics,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn apply(&mut self, outcome: &TickOutcome) {
        self.board.apply(outcome, Instant::now());
    }

    pub fn refresh_theme(&mut self, hour: u32) {
        self.board.theme_mut().refresh(hour);
    }

    fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            self.paused = paused;
            self.poller.set_visible(!paused);
        }
    }

    pub fn handle(&mut self, cmd: UiCommand) -> Flow {
        match cmd {
            UiCommand::Quit => return Flow::Quit,
            UiCommand::ToggleTheme => {
                let dark = self.board.theme_mut().toggle();
                info!(dark, "theme toggled; automatic theme off");
                if let Some(persist) = &mut self.persist {
                    persist.settings.auto_dark = false;
                    persist.settings.dark_mode = dark;
                    if let Err(e) = persist.store.save(&persist.settings) {
                        warn!(error = %format!("{:#}", e), "could not persist theme choice");
                    }
                }
            }
            UiCommand::Refresh => self.poller.refresh(),
            UiCommand::TogglePause => self.set_paused(!self.paused),
            UiCommand::Visibility(visible) => {
                if self.options.pause_on_blur {
                    self.set_paused(!visible);
                }
            }
            UiCommand::ToggleDiagnostics => self.diagnostics = !self.diagnostics,
            UiCommand::Redraw => {}
        }
        Flow::Continue
    }

    pub fn diagnostic_lines(&self) -> Vec<String> {
        let theme = self.board.theme();
        let window = theme.window();
        let mut lines = vec![
            format!("source: {}", self.options.source_label),
            format!("interval: {:?}", self.options.poll_interval),
            format!("ticks: {}", self.board.ticks()),
            format!("last: {}", self.board.last_outcome()),
            format!(
                "theme: {} ({}, dark {}:00-{}:00)",
                if theme.is_dark() { "dark" } else { "light" },
                if theme.is_auto() { "auto" } else { "manual" },
                window.start,
                window.end
            ),
        ];
        if let Some(link) = &self.options.share_link {
            lines.push(format!("share: {}", link));
        }
        lines
    }

    fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let lines = self.diagnostics.then(|| self.diagnostic_lines());
        let view = View {
            board: &self.board,
            now: Instant::now(),
            paused: self.paused,
            help: HELP,
            diagnostics: lines.as_deref(),
        };
        draw::draw(out, &view, cols, rows)?;
        out.flush()
    }

    pub async fn shutdown(self) {
        self.poller.shutdown().await;
    }
}

/// Take over the terminal and run until the user quits.
pub async fn run(mut session: Session, mut outcomes: UnboundedReceiver<TickOutcome>) -> Result<()> {
    let guard = TerminalGuard::enter()?;
    let mut events = EventStream::new();
    let mut redraw = time::interval(REDRAW_EVERY);
    let mut stdout = io::stdout();
    session.refresh_theme(Local::now().hour());

    loop {
        tokio::select! {
            Some(outcome) = outcomes.recv() => session.apply(&outcome),
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if let Some(cmd) = command_for(&event) {
                        if session.handle(cmd) == Flow::Quit {
                            break;
                        }
                    }
                }
                Some(Err(e)) => warn!(error = %e, "terminal event error"),
                None => break,
            },
            _ = redraw.tick() => session.refresh_theme(Local::now().hour()),
        }
        session.draw(&mut stdout).context("drawing frame")?;
    }

    drop(guard);
    session.shutdown().await;
    info!("display closed");
    Ok(())
}
