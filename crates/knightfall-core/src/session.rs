//! Session layer: owns round lifecycle and publishes state to renderers.
//!
//! [`GameSession`] is the long-lived handle a frontend talks to. It
//! starts rounds (stopping any previous one first), forwards player
//! input to the active round, and republishes round state on last-value
//! `watch` channels so any number of views can subscribe and always see
//! the latest snapshot without backpressure on the tick loop.

use std::sync::Arc;

use knightfall_types::{
    Direction, KnightSnapshot, PlayerInput, PlayerSnapshot, RoundOutcome, StepBudget, Tile,
    TickUpdate,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clock::{ClockError, tick_interval};
use crate::config::RoundConfig;
use crate::round::RoundState;
use crate::runner::{RoundControls, RoundObserver, RoundResult, RunnerError, run_round};

/// Capacity of the per-round input queue. Inputs beyond this between two
/// ticks are dropped, which matches the UI's at-most-a-few-per-tick rate.
const INPUT_QUEUE_CAPACITY: usize = 32;

/// Errors from the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested speed multiplier cannot form a tick interval.
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Subscriber ends of every published stream.
///
/// All channels are last-value-cached: a subscriber joining mid-round
/// immediately sees the current state.
#[derive(Debug, Clone)]
pub struct SessionSubscriptions {
    /// The 5x5 tile grid, with explosion highlights.
    pub tiles: watch::Receiver<Vec<Vec<Tile>>>,
    /// The four knights, in west/north/east/south order.
    pub knights: watch::Receiver<Vec<KnightSnapshot>>,
    /// Player position, anchor, and step accounting.
    pub player: watch::Receiver<PlayerSnapshot>,
    /// The round's two randomized step budgets.
    pub step_budget: watch::Receiver<StepBudget>,
    /// Human-readable status line.
    pub status: watch::Receiver<String>,
    /// Latest observed tick value.
    pub progress: watch::Receiver<u64>,
    /// Terminal outcome of the latest round, once decided.
    pub outcome: watch::Receiver<Option<RoundOutcome>>,
}

/// Sender ends of the published streams, shared with the per-round
/// observer task.
#[derive(Debug)]
struct RoundPublisher {
    tiles: watch::Sender<Vec<Vec<Tile>>>,
    knights: watch::Sender<Vec<KnightSnapshot>>,
    player: watch::Sender<PlayerSnapshot>,
    step_budget: watch::Sender<StepBudget>,
    status: watch::Sender<String>,
    progress: watch::Sender<u64>,
    outcome: watch::Sender<Option<RoundOutcome>>,
}

impl RoundPublisher {
    /// Push every snapshot the round exposes. `watch::Sender::send` fails
    /// only with zero receivers, which is normal for a headless session.
    fn publish_snapshots(&self, state: &RoundState) {
        let _ = self.tiles.send(state.tiles_snapshot());
        let _ = self.knights.send(state.knight_snapshots());
        let _ = self.player.send(state.player_snapshot());
        let _ = self.step_budget.send(state.step_budget());
    }
}

/// Observer wired into the round runner; republishes on every tick.
struct PublishObserver {
    publisher: Arc<RoundPublisher>,
}

impl RoundObserver for PublishObserver {
    fn on_tick(&mut self, state: &RoundState, update: &TickUpdate) {
        self.publisher.publish_snapshots(state);
        let _ = self.publisher.progress.send(update.tick);
        if let Some(status) = &update.status {
            let _ = self.publisher.status.send(status.clone());
        }
        if update.outcome.is_some() {
            let _ = self.publisher.outcome.send(update.outcome);
        }
    }

    fn on_finalized(&mut self, state: &RoundState) {
        self.publisher.publish_snapshots(state);
    }
}

/// Handle to the active round's task and channels.
struct ActiveRound {
    controls: Arc<RoundControls>,
    inputs: mpsc::Sender<PlayerInput>,
    handle: JoinHandle<Result<RoundResult, RunnerError>>,
}

/// The long-lived game session.
///
/// One session publishes one set of streams; starting a new round stops
/// the previous one and reuses the same channels, so subscribers survive
/// restarts.
pub struct GameSession {
    config: RoundConfig,
    publisher: Arc<RoundPublisher>,
    subscriptions: SessionSubscriptions,
    active: Option<ActiveRound>,
    rounds_started: u64,
}

impl GameSession {
    /// Create a session with no active round.
    #[must_use]
    pub fn new(config: RoundConfig) -> Self {
        let (tiles_tx, tiles_rx) = watch::channel(Vec::new());
        let (knights_tx, knights_rx) = watch::channel(Vec::new());
        let (player_tx, player_rx) = watch::channel(PlayerSnapshot::default());
        let (budget_tx, budget_rx) = watch::channel(StepBudget::default());
        let (status_tx, status_rx) = watch::channel(String::new());
        let (progress_tx, progress_rx) = watch::channel(0);
        let (outcome_tx, outcome_rx) = watch::channel(None);

        Self {
            config,
            publisher: Arc::new(RoundPublisher {
                tiles: tiles_tx,
                knights: knights_tx,
                player: player_tx,
                step_budget: budget_tx,
                status: status_tx,
                progress: progress_tx,
                outcome: outcome_tx,
            }),
            subscriptions: SessionSubscriptions {
                tiles: tiles_rx,
                knights: knights_rx,
                player: player_rx,
                step_budget: budget_rx,
                status: status_rx,
                progress: progress_rx,
                outcome: outcome_rx,
            },
            active: None,
            rounds_started: 0,
        }
    }

    /// Receiver ends of every published stream.
    #[must_use]
    pub fn subscriptions(&self) -> SessionSubscriptions {
        self.subscriptions.clone()
    }

    /// Start a fresh round, stopping the previous one if still running.
    ///
    /// `speed_override` replaces the configured speed multiplier for
    /// this round only.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Clock`] when the speed multiplier is not
    /// a positive finite number.
    pub async fn start_round(&mut self, speed_override: Option<f64>) -> Result<(), SessionError> {
        let speed = speed_override.unwrap_or(self.config.speed_multiplier);
        let interval = tick_interval(speed)?;

        self.cancel_active().await;

        self.rounds_started = self.rounds_started.wrapping_add(1);
        let mut rng = self.round_rng();
        let state = RoundState::setup(speed, &mut rng);

        // Seed subscribers with the freshly set up round before the
        // first tick lands.
        self.publisher.publish_snapshots(&state);
        let _ = self.publisher.progress.send(0);
        let _ = self.publisher.outcome.send(None);
        let _ = self
            .publisher
            .status
            .send(String::from("Find your starting position!"));

        let controls = Arc::new(RoundControls::new());
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let observer = Box::new(PublishObserver {
            publisher: Arc::clone(&self.publisher),
        });

        info!(
            round = self.rounds_started,
            speed,
            interval_ms = interval.as_millis(),
            "Starting round"
        );

        let handle = tokio::spawn(run_round(
            state,
            Arc::clone(&controls),
            input_rx,
            observer,
            interval,
        ));

        self.active = Some(ActiveRound {
            controls,
            inputs: input_tx,
            handle,
        });
        Ok(())
    }

    /// Stop the active round, if any, and wait for its task to wind down.
    pub async fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            active.controls.request_stop();
            match active.handle.await {
                Ok(Ok(result)) => {
                    info!(outcome = ?result.outcome, "Previous round stopped");
                }
                Ok(Err(err)) => warn!(error = %err, "Previous round failed"),
                Err(err) => warn!(error = %err, "Previous round task panicked"),
            }
        }
    }

    /// Forward a raw input event to the active round.
    ///
    /// Silently dropped when no round is running, the round has ended,
    /// or the queue is momentarily full.
    pub fn send_input(&self, input: PlayerInput) {
        if let Some(active) = &self.active {
            let _ = active.inputs.try_send(input);
        }
    }

    /// Choose the starting cell during the waiting phase.
    pub fn click(&self, row: u8, col: u8) {
        self.send_input(PlayerInput::Click { row, col });
    }

    /// Move one cell in `direction` during an open movement window.
    pub fn step(&self, direction: Direction) {
        self.send_input(PlayerInput::Step(direction));
    }

    /// Jump the clock to just before the first mechanic.
    pub fn skip(&self) {
        self.send_input(PlayerInput::Skip);
    }

    /// Whether a round task is currently held (it may have ended on its
    /// own; this only reflects whether one was started and not cancelled).
    #[must_use]
    pub const fn has_active_round(&self) -> bool {
        self.active.is_some()
    }

    /// Per-round RNG: seeded runs derive a distinct stream per round so
    /// restarting does not replay the previous layout; seed `0` draws
    /// from the operating system.
    fn round_rng(&self) -> StdRng {
        if self.config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(self.config.seed.wrapping_add(self.rounds_started))
        }
    }
}

/// Convenience for tests and demos: a session over an explicit seed.
#[must_use]
pub fn seeded_session(seed: u64) -> GameSession {
    GameSession::new(RoundConfig {
        seed,
        speed_multiplier: 1.0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn starting_a_round_publishes_initial_state() {
        let mut session = seeded_session(5);
        let subs = session.subscriptions();
        session.start_round(None).await.unwrap();

        assert_eq!(subs.tiles.borrow().len(), 5);
        assert_eq!(subs.knights.borrow().len(), 4);
        assert!(subs.outcome.borrow().is_none());
        let budget = *subs.step_budget.borrow();
        assert_ne!(budget.first, budget.second);

        session.cancel_active().await;
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_active_round() {
        let mut session = seeded_session(5);
        session.start_round(None).await.unwrap();
        assert!(session.has_active_round());

        session.start_round(None).await.unwrap();
        assert!(session.has_active_round());

        session.cancel_active().await;
        assert!(!session.has_active_round());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_speed_is_rejected_before_cancelling_anything() {
        let mut session = seeded_session(5);
        session.start_round(None).await.unwrap();

        let err = session.start_round(Some(0.0)).await.unwrap_err();
        assert!(matches!(err, SessionError::Clock(_)));
        assert!(session.has_active_round(), "previous round untouched");

        session.cancel_active().await;
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_rounds_differ_between_restarts() {
        let mut session = seeded_session(9);
        let subs = session.subscriptions();

        session.start_round(None).await.unwrap();
        let first: Vec<_> = subs.knights.borrow().iter().map(|k| k.target).collect();

        session.start_round(None).await.unwrap();
        let second: Vec<_> = subs.knights.borrow().iter().map(|k| k.target).collect();
        session.cancel_active().await;

        // Distinct per-round streams; identical layouts would be a
        // one-in-many coincidence for this seed.
        assert_ne!(first, second);
    }
}
