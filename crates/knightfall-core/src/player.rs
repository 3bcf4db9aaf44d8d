//! The player model: position, safe anchor, and step budget.
//!
//! The model holds state and validates nothing but board boundaries. All
//! game rules (idle-at-start, exact budget consumption, goal check) are
//! evaluated by the round orchestrator; the `failed` flag is write-only
//! from there.

use knightfall_types::{CENTER, Coords, Direction, PlayerSnapshot};

/// The player's mutable state for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    position: Coords,
    starting_position: Option<Coords>,
    steps: u8,
    remaining_steps: i32,
    failed: bool,
}

impl Player {
    /// Create a player standing on the center cell with no active window.
    pub const fn new() -> Self {
        Self {
            position: CENTER,
            starting_position: None,
            steps: 0,
            remaining_steps: 0,
            failed: false,
        }
    }

    /// Unconditionally relocate the player.
    ///
    /// Used during the pre-round waiting phase (click-to-choose-start)
    /// and at round setup.
    pub const fn set_position(&mut self, position: Coords) {
        self.position = position;
    }

    /// Record or clear the safe anchor for the current movement window.
    pub const fn set_starting_position(&mut self, anchor: Option<Coords>) {
        self.starting_position = anchor;
    }

    /// Assign a fresh step budget, resetting the remaining count.
    pub fn set_steps(&mut self, steps: u8) {
        self.steps = steps;
        self.remaining_steps = i32::from(steps);
    }

    /// Attempt a one-cell step.
    ///
    /// A step that would leave the board is silently rejected: no state
    /// change, no budget decrement. An accepted step decrements the
    /// remaining budget by exactly one, even below zero; over-movement is
    /// a loss condition the orchestrator evaluates, not guarded here.
    ///
    /// Returns whether the step was applied.
    pub fn apply_step(&mut self, direction: Direction) -> bool {
        match self.position.stepped(direction) {
            Some(next) => {
                self.position = next;
                self.remaining_steps = self.remaining_steps.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    /// Set the failure flag (orchestrator only).
    pub const fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
    }

    /// Current occupied cell.
    pub const fn position(&self) -> Coords {
        self.position
    }

    /// The safe anchor of the active movement window, if any.
    pub const fn starting_position(&self) -> Option<Coords> {
        self.starting_position
    }

    /// Steps still owed in the current window.
    pub const fn remaining_steps(&self) -> i32 {
        self.remaining_steps
    }

    /// Whether a loss has been finalized against this player.
    pub const fn failed(&self) -> bool {
        self.failed
    }

    /// Published view of the player.
    pub const fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            starting_position: self.starting_position,
            steps: self.steps,
            remaining_steps: self.remaining_steps,
            failed: self.failed,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
