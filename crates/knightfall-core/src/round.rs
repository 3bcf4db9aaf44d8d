//! The round orchestrator: a tick-driven phase state machine.
//!
//! One [`RoundState`] value owns everything a round mutates: the clock,
//! the board, the four knights, the player, and the randomized step
//! budgets. The external tick stream drives [`RoundState::apply_tick`],
//! which walks the fixed timetable relative to `ROUND_START`:
//!
//! | observed tick `v`          | action                                        |
//! |----------------------------|-----------------------------------------------|
//! | `v < start`                | countdown; player clicks a starting cell      |
//! | `v == start - 2`           | idle check, then North+South arm              |
//! | `start <= v < start + 10`  | row explosion at entry, first movement window |
//! | `v == start + 10`          | budget check, East+West arm                   |
//! | `v == start + 12`          | column explosion                              |
//! | `start+16 <= v < start+25` | second movement window                        |
//! | `v == start + 25`          | budget check, goal check, win or loss         |
//!
//! Explosion highlights are cleared by deferred effects keyed to the tick
//! clock (`clear at v + 1`), so cancelling a round deterministically
//! cancels them too. The one post-termination effect that outlives the
//! tick stream -- disarming the knights and setting the player's failure
//! flag -- is [`RoundState::finalize`], invoked by the runner one tick
//! interval after the terminal update.

use knightfall_types::{
    CENTER, Coords, Direction, GOAL, KnightSnapshot, PlayerInput, RoundOutcome, RoundPhase,
    StepBudget, Tile, TickUpdate,
};
use rand::Rng;
use tracing::{debug, info};

use crate::board::Board;
use crate::clock::{ClockError, RoundClock};
use crate::knight::Knight;
use crate::player::Player;

/// The observed tick at which the first hazards arm.
pub const ROUND_START: u64 = 23;

/// Length of the first movement window in ticks.
const FIRST_WINDOW_LEN: u64 = 10;

/// Offset of the column explosion from `ROUND_START`.
const COLUMN_EXPLOSION_OFFSET: u64 = 12;

/// Offset of the second movement window's first tick from `ROUND_START`.
const SECOND_WINDOW_OFFSET: u64 = 16;

/// Offset of the resolve tick from `ROUND_START`.
const RESOLVE_OFFSET: u64 = 25;

/// Draw two *distinct* integers from `[from, to]` by sampling without
/// replacement: build the candidate pool, draw one, remove it, draw again.
///
/// Requires `from < to`; a degenerate interval returns `(from, from)`.
pub fn two_distinct_in_range(rng: &mut impl Rng, from: u8, to: u8) -> (u8, u8) {
    if to <= from {
        return (from, from);
    }
    let mut pool: Vec<u8> = (from..=to).collect();
    let first = pool.remove(rng.random_range(0..pool.len()));
    let second = pool.remove(rng.random_range(0..pool.len()));
    (first, second)
}

/// The four knights of a round, one per cardinal direction.
#[derive(Debug, Clone, PartialEq)]
struct KnightSet {
    west: Knight,
    north: Knight,
    east: Knight,
    south: Knight,
}

impl KnightSet {
    /// Create four inert knights carrying the round's speed multiplier.
    const fn new(speed_multiplier: f64) -> Self {
        Self {
            west: Knight::new(Direction::West, speed_multiplier),
            north: Knight::new(Direction::North, speed_multiplier),
            east: Knight::new(Direction::East, speed_multiplier),
            south: Knight::new(Direction::South, speed_multiplier),
        }
    }

    /// Published knight list, in the renderer's west/north/east/south order.
    fn snapshots(&self) -> Vec<KnightSnapshot> {
        vec![
            self.west.snapshot(),
            self.north.snapshot(),
            self.east.snapshot(),
            self.south.snapshot(),
        ]
    }

    /// Targets of the row-sweeping knights, once assigned.
    fn row_targets(&self) -> Vec<u8> {
        [self.north.target(), self.south.target()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Targets of the column-sweeping knights, once assigned.
    fn col_targets(&self) -> Vec<u8> {
        [self.east.target(), self.west.target()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Stand down all four knights.
    const fn disarm_all(&mut self) {
        self.west.disarm();
        self.north.disarm();
        self.east.disarm();
        self.south.disarm();
    }
}

/// A side effect scheduled against the tick clock rather than wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeferredEffect {
    /// First observed tick at which the effect runs.
    due_tick: u64,
    /// What to do.
    kind: EffectKind,
}

/// The kinds of tick-keyed deferred effects a round schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectKind {
    /// Clear every row highlight on the board.
    ClearRowExplosions,
    /// Clear every column highlight on the board.
    ClearColExplosions,
}

/// All mutable state of one round.
///
/// Created fresh by [`setup`](Self::setup) for every round; no state is
/// shared between rounds.
#[derive(Debug)]
pub struct RoundState {
    clock: RoundClock,
    board: Board,
    knights: KnightSet,
    player: Player,
    step_budget: StepBudget,
    movement_open: bool,
    vertical_armed: bool,
    ended: bool,
    finalized: bool,
    outcome: Option<RoundOutcome>,
    pending: Vec<DeferredEffect>,
    last_observed: u64,
}

impl RoundState {
    /// Build a fresh round: new board, four knights with randomized
    /// targets, player on the center cell, randomized step budgets.
    ///
    /// The two knights of each axis get opposite sides (`side` and
    /// `1 - side`) and distinct step distances, so their targets never
    /// coincide on the same line.
    pub fn setup(speed_multiplier: f64, rng: &mut impl Rng) -> Self {
        let mut knights = KnightSet::new(speed_multiplier);

        let side: u8 = rng.random_range(0..=1);

        let (steps_a, steps_b) = two_distinct_in_range(rng, 1, 3);
        knights.west.init(side, steps_a);
        knights.east.init(1_u8.saturating_sub(side), steps_b);

        let (steps_c, steps_d) = two_distinct_in_range(rng, 1, 3);
        knights.south.init(side, steps_c);
        knights.north.init(1_u8.saturating_sub(side), steps_d);

        let (first, second) = two_distinct_in_range(rng, 2, 4);
        let step_budget = StepBudget { first, second };

        let mut player = Player::new();
        player.set_position(CENTER);
        player.set_starting_position(None);
        player.set_steps(0);

        info!(
            west = ?knights.west.target(),
            north = ?knights.north.target(),
            east = ?knights.east.target(),
            south = ?knights.south.target(),
            first_budget = first,
            second_budget = second,
            "Round set up"
        );

        Self {
            clock: RoundClock::new(ROUND_START),
            board: Board::new(),
            knights,
            player,
            step_budget,
            movement_open: false,
            vertical_armed: false,
            ended: false,
            finalized: false,
            outcome: None,
            pending: Vec::new(),
            last_observed: 0,
        }
    }

    /// Process one tick of the external clock.
    ///
    /// Runs any deferred effects that have come due, then the phase logic
    /// for the observed tick value. Synchronous to completion; the caller
    /// must not deliver the next tick (or any input) concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the tick counter overflows.
    pub fn apply_tick(&mut self) -> Result<TickUpdate, ClockError> {
        if self.ended {
            // The stream should have been halted; report terminal state.
            return Ok(TickUpdate {
                tick: self.last_observed,
                phase: RoundPhase::Ended,
                status: None,
                outcome: self.outcome,
            });
        }

        let v = self.clock.next_tick()?;
        self.last_observed = v;
        self.run_due_effects(v);

        debug!(tick = v, "Tick");

        let mut status: Option<String> = None;

        // Countdown before the first mechanic.
        if v < ROUND_START {
            status = Some(format!(
                "Find your starting position! Seconds left: {}",
                ROUND_START.saturating_sub(v)
            ));
        }

        if v == ROUND_START.saturating_sub(2) {
            if self.player.position() == CENTER {
                // Player never clicked a starting cell.
                self.stop(RoundOutcome::NoStartingPosition);
                status = Some(String::from(
                    "You did not choose a starting location. DOOM.",
                ));
            } else {
                self.knights.south.arm();
                self.knights.north.arm();
                self.vertical_armed = true;
                info!(tick = v, "Vertical knights armed");
                status = Some(String::from("Moving North and South"));
            }
        } else if v >= ROUND_START && v < ROUND_START.saturating_add(FIRST_WINDOW_LEN) {
            if v == ROUND_START {
                status = self.fire_row_explosion(v);
            }
            if !self.ended {
                // Seconds left: 10 + (start - v).
                status = Some(format!(
                    "Move your first amount of steps ({})! Seconds left: {}",
                    self.step_budget.first,
                    ROUND_START
                        .saturating_add(FIRST_WINDOW_LEN)
                        .saturating_sub(v)
                ));
            }
        } else if v == ROUND_START.saturating_add(FIRST_WINDOW_LEN) {
            self.movement_open = false;
            if self.player.remaining_steps() == 0 {
                self.player.set_steps(0);
                self.player.set_starting_position(None);
                self.knights.east.arm();
                self.knights.west.arm();
                info!(tick = v, "Horizontal knights armed");
                status = Some(String::from("Moving East and West"));
            } else {
                self.stop(RoundOutcome::StepsNotConsumed);
                status = Some(String::from(
                    "You did not move the required amount of steps! DOOOOOOM!!!",
                ));
            }
        } else if v == ROUND_START.saturating_add(COLUMN_EXPLOSION_OFFSET) {
            status = Some(self.fire_col_explosion(v));
        } else if v >= ROUND_START.saturating_add(SECOND_WINDOW_OFFSET)
            && v < ROUND_START.saturating_add(RESOLVE_OFFSET)
        {
            self.movement_open = true;
            if v == ROUND_START.saturating_add(SECOND_WINDOW_OFFSET) {
                self.player.set_steps(self.step_budget.second);
                self.player.set_starting_position(Some(self.player.position()));
            }
            // Seconds left: 8 + (start + 16 - v).
            status = Some(format!(
                "Move your second amount of steps ({})! Seconds left: {}",
                self.step_budget.second,
                ROUND_START
                    .saturating_add(RESOLVE_OFFSET)
                    .saturating_sub(1)
                    .saturating_sub(v)
            ));
        } else if v == ROUND_START.saturating_add(RESOLVE_OFFSET) {
            self.movement_open = false;
            if self.player.remaining_steps() != 0 {
                self.stop(RoundOutcome::StepsNotConsumed);
                status = Some(String::from(
                    "You did not move the required amount of steps! DOOOOOOM!!!",
                ));
            } else {
                self.player.set_steps(0);
                self.player.set_starting_position(None);
                if self.player.position() == GOAL {
                    self.stop(RoundOutcome::Victory);
                    status = Some(String::from(
                        "You reached the goal in time without getting hit. Good job!",
                    ));
                } else {
                    self.stop(RoundOutcome::GoalNotReached);
                    status = Some(String::from("You did not reach the target tile. DOOOOOM"));
                }
            }
        }

        let outcome = if self.ended { self.outcome } else { None };
        Ok(TickUpdate {
            tick: v,
            phase: phase_for(v),
            status,
            outcome,
        })
    }

    /// Apply a raw input event, honoring the current phase.
    ///
    /// Clicks relocate the player only during the waiting phase; steps are
    /// applied only inside an open movement window; the skip is honored
    /// once, before the first hazard arms. Everything else is silently
    /// ignored.
    pub fn handle_input(&mut self, input: PlayerInput) {
        if self.ended {
            return;
        }
        match input {
            PlayerInput::Step(direction) => {
                if self.movement_open {
                    let applied = self.player.apply_step(direction);
                    debug!(?direction, applied, "Step input");
                }
            }
            PlayerInput::Click { row, col } => {
                if !self.vertical_armed
                    && let Some(cell) = Coords::new(row, col)
                {
                    self.player.set_position(cell);
                    debug!(row, col, "Starting cell chosen");
                }
            }
            PlayerInput::Skip => {
                if !self.vertical_armed {
                    let offset = self.clock.skip_to_first_mechanic();
                    info!(offset, "Skip to first mechanic requested");
                }
            }
        }
    }

    /// Terminal cleanup, run one tick interval after the round ended so
    /// in-flight explosion highlights have finished: disarm every knight,
    /// clear remaining highlights, and set the player's failure flag
    /// (`false` on the victory path).
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.pending.clear();
        self.knights.disarm_all();
        self.board.clear_all_explosions();
        let failed = self.outcome.is_some_and(RoundOutcome::is_loss);
        self.player.set_failed(failed);
        info!(outcome = ?self.outcome, failed, "Round finalized");
    }

    /// Fire the row explosion at the first tick of the first window.
    ///
    /// Returns the DOOM status line on a hit; on a miss the first-window
    /// prompt takes over.
    fn fire_row_explosion(&mut self, v: u64) -> Option<String> {
        let targets = self.knights.row_targets();
        self.board.set_row_explosions(&targets);
        self.schedule(v, EffectKind::ClearRowExplosions);

        let player_row = self.player.position().row;
        if self.knights.south.target() == Some(player_row) {
            self.stop(RoundOutcome::RowSwept {
                direction: Direction::South,
            });
            Some(String::from(
                "Explosion: The row you are on was hit by the knight walking south!! DOOOM",
            ))
        } else if self.knights.north.target() == Some(player_row) {
            self.stop(RoundOutcome::RowSwept {
                direction: Direction::North,
            });
            Some(String::from(
                "Explosion: The row you are on was hit by the knight walking north!! DOOOM",
            ))
        } else {
            // Safe: open the first movement window.
            self.movement_open = true;
            self.player.set_steps(self.step_budget.first);
            self.player.set_starting_position(Some(self.player.position()));
            None
        }
    }

    /// Fire the column explosion, returning the status line.
    fn fire_col_explosion(&mut self, v: u64) -> String {
        let targets = self.knights.col_targets();
        self.board.set_col_explosions(&targets);
        self.schedule(v, EffectKind::ClearColExplosions);

        let player_col = self.player.position().col;
        if self.knights.east.target() == Some(player_col) {
            self.stop(RoundOutcome::ColumnSwept {
                direction: Direction::East,
            });
            String::from(
                "Explosion: The column you are on was hit by the knight walking east!! DOOOM",
            )
        } else if self.knights.west.target() == Some(player_col) {
            self.stop(RoundOutcome::ColumnSwept {
                direction: Direction::West,
            });
            String::from(
                "Explosion: The column you are on was hit by the knight walking west!! DOOOM",
            )
        } else {
            String::from("Explosion! You are safe!")
        }
    }

    /// Halt the round with a terminal outcome. Movement freezes and no
    /// further phase transitions fire; [`finalize`](Self::finalize) runs
    /// one tick interval later.
    fn stop(&mut self, outcome: RoundOutcome) {
        self.ended = true;
        self.movement_open = false;
        self.outcome = Some(outcome);
        info!(?outcome, "Round ended");
    }

    /// Schedule a deferred effect for one tick after `v`.
    fn schedule(&mut self, v: u64, kind: EffectKind) {
        self.pending.push(DeferredEffect {
            due_tick: v.saturating_add(1),
            kind,
        });
    }

    /// Run every deferred effect that has come due at observed tick `v`.
    fn run_due_effects(&mut self, v: u64) {
        let pending = std::mem::take(&mut self.pending);
        let (due, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|e| e.due_tick <= v);
        self.pending = rest;
        for effect in due {
            match effect.kind {
                EffectKind::ClearRowExplosions => self.board.clear_row_explosions(),
                EffectKind::ClearColExplosions => self.board.clear_col_explosions(),
            }
        }
    }

    // -----------------------------------------------------------------------
    // Published views
    // -----------------------------------------------------------------------

    /// Published copy of the tile grid.
    pub fn tiles_snapshot(&self) -> Vec<Vec<Tile>> {
        self.board.snapshot()
    }

    /// Published knight list (west, north, east, south).
    pub fn knight_snapshots(&self) -> Vec<KnightSnapshot> {
        self.knights.snapshots()
    }

    /// Published player view.
    pub const fn player_snapshot(&self) -> knightfall_types::PlayerSnapshot {
        self.player.snapshot()
    }

    /// The two randomized per-window step budgets.
    pub const fn step_budget(&self) -> StepBudget {
        self.step_budget
    }

    /// Terminal outcome, once the round has ended.
    pub const fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    /// Whether the round has reached a terminal state.
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether terminal cleanup has run.
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whether a movement window is currently accepting steps.
    pub const fn movement_open(&self) -> bool {
        self.movement_open
    }
}

/// Map an observed tick value to its phase name.
const fn phase_for(v: u64) -> RoundPhase {
    if v == ROUND_START.saturating_sub(2) {
        RoundPhase::ArmVertical
    } else if v < ROUND_START {
        RoundPhase::Waiting
    } else if v < ROUND_START.saturating_add(FIRST_WINDOW_LEN) {
        RoundPhase::FirstWindow
    } else if v < ROUND_START.saturating_add(COLUMN_EXPLOSION_OFFSET) {
        RoundPhase::ArmHorizontal
    } else if v < ROUND_START.saturating_add(SECOND_WINDOW_OFFSET) {
        RoundPhase::ColumnExplosion
    } else if v < ROUND_START.saturating_add(RESOLVE_OFFSET) {
        RoundPhase::SecondWindow
    } else {
        RoundPhase::Resolve
    }
}
