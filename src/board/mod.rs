// src/board/mod.rs

pub mod state;
pub mod theme;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{poller::TickOutcome, status::date_parser::format_time_of_day, status::MeetStatus};
pub use state::Connection;
pub use theme::{ThemeController, ThemeWindow};

/// How long a changed field stays highlighted.
pub const FLASH_DURATION: Duration = Duration::from_millis(1000);

const PLACEHOLDER: &str = "--";

/// Which fields changed on a render and should flash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pulse {
    pub event: bool,
    pub heat: bool,
}

/// Everything the screen shows. The terminal view only reads from it; all
/// mutation goes through [`Board::apply`], [`Board::render`] and the theme.
#[derive(Debug)]
pub struct Board {
    meet_name: String,
    event: String,
    heat: String,
    updated: String,
    connection: Connection,
    connection_detail: Option<String>,
    theme: ThemeController,
    event_flash_until: Option<Instant>,
    heat_flash_until: Option<Instant>,
    ticks: u64,
    last_outcome: String,
}

impl Board {
    pub fn new(meet_name: impl Into<String>, theme: ThemeController) -> Self {
        Self {
            meet_name: meet_name.into(),
            event: PLACEHOLDER.to_string(),
            heat: PLACEHOLDER.to_string(),
            updated: String::new(),
            connection: Connection::Connecting,
            connection_detail: None,
            theme,
            event_flash_until: None,
            heat_flash_until: None,
            ticks: 0,
            last_outcome: "none yet".to_string(),
        }
    }

    pub fn meet_name(&self) -> &str {
        &self.meet_name
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn heat(&self) -> &str {
        &self.heat
    }

    pub fn updated(&self) -> &str {
        &self.updated
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    /// Error text behind the badge, if the last fetch failed.
    pub fn connection_detail(&self) -> Option<&str> {
        self.connection_detail.as_deref()
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn theme_mut(&mut self) -> &mut ThemeController {
        &mut self.theme
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_outcome(&self) -> &str {
        &self.last_outcome
    }

    pub fn event_flashing(&self, now: Instant) -> bool {
        self.event_flash_until.is_some_and(|until| now < until)
    }

    pub fn heat_flashing(&self, now: Instant) -> bool {
        self.heat_flash_until.is_some_and(|until| now < until)
    }

    /// Fold one poller outcome into the display.
    pub fn apply(&mut self, outcome: &TickOutcome, now: Instant) -> Pulse {
        self.ticks += 1;
        match outcome {
            TickOutcome::Status(status) => {
                self.set_connection(Connection::Connected, None);
                self.last_outcome = format!("status {}/{}", status.event, status.heat);
                self.render(status, now)
            }
            TickOutcome::Skipped => {
                self.set_connection(Connection::Connected, None);
                self.last_outcome = "skipped (no data row)".to_string();
                Pulse::default()
            }
            TickOutcome::Failed(message) => {
                self.set_connection(Connection::Error, Some(message.clone()));
                self.last_outcome = format!("failed: {}", message);
                Pulse::default()
            }
        }
    }

    /// Show `status`; fields that differ from what is on screen flash.
    pub fn render(&mut self, status: &MeetStatus, now: Instant) -> Pulse {
        let pulse = Pulse {
            event: status.event != self.event,
            heat: status.heat != self.heat,
        };

        if pulse.event {
            debug!(from = %self.event, to = %status.event, "event changed");
            self.event = status.event.clone();
            self.event_flash_until = Some(now + FLASH_DURATION);
        }
        if pulse.heat {
            debug!(from = %self.heat, to = %status.heat, "heat changed");
            self.heat = status.heat.clone();
            self.heat_flash_until = Some(now + FLASH_DURATION);
        }
        // An empty cell keeps the previous label.
        if !status.updated_at.is_empty() {
            self.updated = format_time_of_day(&status.updated_at);
        }
        pulse
    }

    fn set_connection(&mut self, connection: Connection, detail: Option<String>) {
        if connection != self.connection {
            info!(from = self.connection.as_str(), to = connection.as_str(), "connection changed");
        }
        self.connection = connection;
        self.connection_detail = detail;
    }
}
