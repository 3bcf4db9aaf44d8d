//! Async driver for a round: owns the interval timer, feeds ticks and
//! queued inputs into [`RoundState`], and reports progress through a
//! [`RoundObserver`].
//!
//! The runner is the only place where wall time exists. Everything below
//! it is synchronous and tick-addressed, which is what makes the round
//! logic testable without a timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use knightfall_types::{PlayerInput, RoundOutcome, TickUpdate};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::clock::ClockError;
use crate::round::RoundState;

/// Errors the round driver can surface.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The tick counter overflowed or the clock was misconfigured.
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Shared handle for requesting a round to stop from outside the loop.
///
/// Starting a new round stops the previous one through its controls; the
/// old task observes the flag at its next tick and winds down.
#[derive(Debug)]
pub struct RoundControls {
    stop: AtomicBool,
    started_at: DateTime<Utc>,
}

impl RoundControls {
    /// Fresh controls, stamped with the round's start time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            started_at: Utc::now(),
        }
    }

    /// Ask the running round to stop at its next tick boundary.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Wall-clock instant the round started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for RoundControls {
    fn default() -> Self {
        Self::new()
    }
}

/// Hook invoked by the runner after every processed tick and once after
/// terminal cleanup. Implementations publish state to whoever renders it.
pub trait RoundObserver: Send {
    /// Called after each tick has been applied, with the update it produced.
    fn on_tick(&mut self, state: &RoundState, update: &TickUpdate);

    /// Called once, after [`RoundState::finalize`] has run.
    fn on_finalized(&mut self, state: &RoundState);
}

/// Observer that does nothing. Useful for tests and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl RoundObserver for NoOpObserver {
    fn on_tick(&mut self, _state: &RoundState, _update: &TickUpdate) {}

    fn on_finalized(&mut self, _state: &RoundState) {}
}

/// How a round run came to a halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    /// Terminal outcome, or `None` when the round was stopped externally.
    pub outcome: Option<RoundOutcome>,
    /// Last observed tick value.
    pub last_tick: u64,
}

/// Drive `state` to completion on a fixed `tick_interval`.
///
/// Inputs arriving on `inputs` between ticks are applied immediately;
/// ticks and inputs are serialized on this task, so round state is never
/// touched concurrently. The loop ends when the round reaches a terminal
/// outcome or `controls` request a stop, then sleeps one further interval
/// (letting in-flight explosion highlights run their course) and runs
/// terminal cleanup.
///
/// # Errors
///
/// Returns [`RunnerError::Clock`] if the tick counter overflows.
pub async fn run_round(
    mut state: RoundState,
    controls: Arc<RoundControls>,
    mut inputs: mpsc::Receiver<PlayerInput>,
    mut observer: Box<dyn RoundObserver>,
    tick_interval: Duration,
) -> Result<RoundResult, RunnerError> {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first fire is immediate; consume it so tick 0 lands one
    // interval after start, like every tick after it.
    ticker.tick().await;

    let mut inputs_open = true;
    let mut last_tick = 0_u64;

    loop {
        if controls.stop_requested() {
            info!(last_tick, "Stop requested, winding round down");
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let update = state.apply_tick()?;
                last_tick = update.tick;
                observer.on_tick(&state, &update);
                if state.is_ended() {
                    break;
                }
            }
            maybe_input = inputs.recv(), if inputs_open => {
                match maybe_input {
                    Some(input) => state.handle_input(input),
                    None => {
                        // Sender dropped; keep ticking without inputs.
                        warn!("Input channel closed before round end");
                        inputs_open = false;
                    }
                }
            }
        }
    }

    // Inputs are frozen from here; drain nothing further.
    inputs.close();

    tokio::time::sleep(tick_interval).await;
    state.finalize();
    observer.on_finalized(&state);

    let result = RoundResult {
        outcome: state.outcome(),
        last_tick,
    };
    info!(outcome = ?result.outcome, last_tick = result.last_tick, "Round run complete");
    Ok(result)
}
