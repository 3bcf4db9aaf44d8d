//! Core round engine for Knightfall.
//!
//! A round is a fixed timetable of phases driven by an external tick
//! stream: the player picks a starting cell during a countdown, dodges a
//! pair of row-sweeping knights, spends an exact step budget, dodges a
//! pair of column-sweeping knights, spends a second budget, and must be
//! standing on the goal cell when the round resolves.
//!
//! Layering, bottom up:
//!
//! - [`clock`]: raw/observed tick bookkeeping and the one-shot skip.
//! - [`board`], [`knight`], [`player`]: the pieces a round owns.
//! - [`round`]: the synchronous phase state machine.
//! - [`runner`]: the async tick loop that drives a round in wall time.
//! - [`session`]: round lifecycle plus `watch`-channel publication.
//! - [`config`]: YAML-backed settings for seed, speed, and logging.

pub mod board;
pub mod clock;
pub mod config;
pub mod knight;
pub mod player;
pub mod round;
pub mod runner;
pub mod session;

pub use clock::{ClockError, RoundClock, tick_interval};
pub use config::{ConfigError, GameConfig, LoggingConfig, RoundConfig};
pub use round::{ROUND_START, RoundState, two_distinct_in_range};
pub use runner::{NoOpObserver, RoundControls, RoundObserver, RoundResult, RunnerError, run_round};
pub use session::{GameSession, SessionError, SessionSubscriptions, seeded_session};
