//! The knight model: one directional line-sweep hazard.
//!
//! Each round owns four knights, one per cardinal direction. North/South
//! knights sweep a row; East/West knights sweep a column. A knight's
//! target line is assigned once per round from a `(side, steps)` pair:
//! `side` selects which half of the axis the line lies in and `steps` is
//! the distance from the center line, clamped to the board edge, so the
//! target is always one of the two non-center lines in that half.
//!
//! Paired knights on the same axis are initialized with opposite sides,
//! which is what guarantees their targets never coincide.

use knightfall_types::{Direction, KnightSnapshot};

/// Index of the center line on either axis of the 5x5 board.
const CENTER_LINE: u8 = 2;

/// Highest line index on either axis.
const LAST_LINE: u8 = 4;

/// A directional line-sweep hazard.
///
/// `target` is only meaningful after [`init`](Self::init) has been called
/// for the current round; `ready` stays `false` until [`arm`](Self::arm)
/// fires and is cleared again when the round finalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct Knight {
    direction: Direction,
    target: Option<u8>,
    ready: bool,
    speed_multiplier: f64,
}

impl Knight {
    /// Create an inert knight for the given direction.
    ///
    /// The speed multiplier is copied from the round configuration; the
    /// renderer uses it to pace the sweep animation.
    pub const fn new(direction: Direction, speed_multiplier: f64) -> Self {
        Self {
            direction,
            target: None,
            ready: false,
            speed_multiplier,
        }
    }

    /// Assign this round's target line from a `(side, steps)` pair.
    ///
    /// `side` 0 selects the low half of the axis, anything else the high
    /// half; `steps` (1..=3) is the distance from the center line, clamped
    /// to the board. Arming is *not* done here; that happens in [`arm`](Self::arm).
    pub const fn init(&mut self, side: u8, steps: u8) {
        let target = if side == 0 {
            CENTER_LINE.saturating_sub(steps)
        } else {
            let line = CENTER_LINE.saturating_add(steps);
            if line > LAST_LINE { LAST_LINE } else { line }
        };
        self.target = Some(target);
    }

    /// Mark the knight as actively sweeping its line.
    ///
    /// Idempotent per round: arming an armed knight has no further effect.
    pub const fn arm(&mut self) {
        self.ready = true;
    }

    /// Stand the knight down (round end).
    pub const fn disarm(&mut self) {
        self.ready = false;
    }

    /// The direction this knight walks.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// The line index this knight will strike, once assigned.
    pub const fn target(&self) -> Option<u8> {
        self.target
    }

    /// Whether the knight is armed.
    pub const fn ready(&self) -> bool {
        self.ready
    }

    /// Published view of this knight.
    pub const fn snapshot(&self) -> KnightSnapshot {
        KnightSnapshot {
            direction: self.direction,
            axis: self.direction.sweep_axis(),
            target: self.target,
            ready: self.ready,
        }
    }
}
