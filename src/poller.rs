// src/poller.rs

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    source::Source,
    status::{parse_csv, MeetStatus},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Result of one tick, forwarded to the display in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Row 2 parsed; render it.
    Status(MeetStatus),
    /// Transport succeeded but the body had no usable row. Nothing to render.
    Skipped,
    /// Network error or non-success status. Last values stay on screen.
    Failed(String),
}

#[derive(Debug)]
enum PollCommand {
    Visible(bool),
    Refresh,
    Shutdown,
}

/// Control side of a running poller.
pub struct PollHandle {
    commands: mpsc::UnboundedSender<PollCommand>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Hidden tears the timer down; visible re-arms it with an immediate tick.
    pub fn set_visible(&self, visible: bool) {
        let _ = self.commands.send(PollCommand::Visible(visible));
    }

    /// Run one tick now without touching the timer.
    pub fn refresh(&self) {
        let _ = self.commands.send(PollCommand::Refresh);
    }

    /// Stop the poller and wait for its loop to exit. Fetches already in
    /// flight may still deliver their outcome.
    pub async fn shutdown(self) {
        let _ = self.commands.send(PollCommand::Shutdown);
        let _ = self.task.await;
    }
}

/// Fetch and parse once.
#[instrument(level = "debug", skip_all, fields(source = %source.describe()))]
pub async fn run_tick(source: &Source) -> TickOutcome {
    match source.fetch_csv().await {
        Ok(body) => match parse_csv(&body) {
            Some(status) => {
                debug!(event = %status.event, heat = %status.heat, "parsed status");
                TickOutcome::Status(status)
            }
            None => {
                debug!(bytes = body.len(), "no data row; skipping tick");
                TickOutcome::Skipped
            }
        },
        Err(e) => {
            let message = format!("{:#}", e);
            warn!(error = %message, "fetch failed");
            TickOutcome::Failed(message)
        }
    }
}

/// Start polling `source` every `period`. The first tick fires immediately.
pub fn spawn(source: Source, period: Duration) -> (PollHandle, mpsc::UnboundedReceiver<TickOutcome>) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(poll_loop(source, period, cmd_rx, out_tx));
    (
        PollHandle {
            commands: cmd_tx,
            task,
        },
        out_rx,
    )
}

fn arm(period: Duration) -> Interval {
    let mut timer = time::interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}

// Each tick gets its own task: a slow fetch does not hold back the next one,
// and outcomes are delivered in whatever order they complete.
fn spawn_tick(source: &Source, out: &mpsc::UnboundedSender<TickOutcome>) {
    let source = source.clone();
    let out = out.clone();
    tokio::spawn(async move {
        let outcome = run_tick(&source).await;
        let _ = out.send(outcome);
    });
}

async fn poll_loop(
    source: Source,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<PollCommand>,
    out: mpsc::UnboundedSender<TickOutcome>,
) {
    info!(source = %source.describe(), period = ?period, "poller started");
    let mut timer = Some(arm(period));

    loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                None | Some(PollCommand::Shutdown) => break,
                Some(PollCommand::Visible(false)) => {
                    if timer.take().is_some() {
                        info!("display hidden; polling paused");
                    }
                }
                Some(PollCommand::Visible(true)) => {
                    if timer.is_none() {
                        info!("display visible; polling resumed");
                        timer = Some(arm(period));
                    }
                }
                Some(PollCommand::Refresh) => spawn_tick(&source, &out),
            },
            _ = next_tick(&mut timer) => spawn_tick(&source, &out),
        }
    }

    info!("poller stopped");
}
