//! Enumeration types for the Knightfall round engine.
//!
//! The cardinal directions, sweep axes, tile colors, round phases, terminal
//! round outcomes, and the player input alphabet.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Directions and axes
// ---------------------------------------------------------------------------

/// A cardinal direction on the grid.
///
/// Row 0 is the top of the board, so North decreases the row index and
/// South increases it. Each of the four knights owns one direction; the
/// player's step inputs use the same alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Toward row 0.
    North,
    /// Toward the highest column index.
    East,
    /// Toward the highest row index.
    South,
    /// Toward column 0.
    West,
}

impl Direction {
    /// Unit delta `(d_row, d_col)` for a one-cell step in this direction.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }

    /// The line axis a knight walking in this direction sweeps.
    ///
    /// North/South knights cross the board vertically and strike a whole
    /// row; East/West knights cross horizontally and strike a column.
    pub const fn sweep_axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Row,
            Self::East | Self::West => Axis::Col,
        }
    }
}

/// The axis of a swept line: a whole row or a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Axis {
    /// A horizontal line (fixed row index).
    Row,
    /// A vertical line (fixed column index).
    Col,
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// Base color of a board tile, fixed at board construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    /// The single goal tile.
    Aqua,
    /// Dark checkerboard square.
    Black,
    /// Light checkerboard square.
    White,
}

// ---------------------------------------------------------------------------
// Round phases and outcomes
// ---------------------------------------------------------------------------

/// Named phase of the round state machine.
///
/// Phases are derived from the observed tick value relative to the round
/// start constant; they exist so the renderer and the status line can name
/// where the round currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RoundPhase {
    /// Pre-round countdown; the player picks a starting cell by clicking.
    Waiting,
    /// The North and South knights arm.
    ArmVertical,
    /// First movement window; the row explosion fires at its first tick.
    FirstWindow,
    /// Movement freezes; the East and West knights arm.
    ArmHorizontal,
    /// The column explosion fires.
    ColumnExplosion,
    /// Second movement window.
    SecondWindow,
    /// Final step-budget and goal checks.
    Resolve,
    /// The round has terminated (win or loss).
    Ended,
}

/// Terminal result of a round.
///
/// Every loss is a deliberate terminal transition, not an error path.
/// There is exactly one success variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RoundOutcome {
    /// The player reached the goal tile with both budgets exactly consumed.
    Victory,
    /// The player never left the center cell before the vertical knights armed.
    NoStartingPosition,
    /// The player's row matched an armed knight's target at explosion time.
    RowSwept {
        /// The knight whose sweep caught the player.
        direction: Direction,
    },
    /// The player's column matched an armed knight's target at explosion time.
    ColumnSwept {
        /// The knight whose sweep caught the player.
        direction: Direction,
    },
    /// A movement window closed with a non-zero remaining step budget.
    StepsNotConsumed,
    /// The final position was not the goal tile.
    GoalNotReached,
}

impl RoundOutcome {
    /// Whether this outcome is a loss (everything except [`Self::Victory`]).
    pub const fn is_loss(self) -> bool {
        !matches!(self, Self::Victory)
    }
}

// ---------------------------------------------------------------------------
// Player input
// ---------------------------------------------------------------------------

/// A raw input event from the presentation collaborator.
///
/// Inputs arrive asynchronously relative to the tick stream and are applied
/// by the round task, serialized behind tick processing. Inputs that are
/// not valid for the current phase are silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlayerInput {
    /// Attempt a one-cell directional step (movement windows only).
    Step(Direction),
    /// Relocate to a clicked cell (waiting phase only).
    Click {
        /// Clicked row index.
        row: u8,
        /// Clicked column index.
        col: u8,
    },
    /// One-shot fast-forward through the waiting phase.
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_unit_steps() {
        assert_eq!(Direction::North.delta(), (-1, 0));
        assert_eq!(Direction::South.delta(), (1, 0));
        assert_eq!(Direction::East.delta(), (0, 1));
        assert_eq!(Direction::West.delta(), (0, -1));
    }

    #[test]
    fn vertical_knights_sweep_rows() {
        assert_eq!(Direction::North.sweep_axis(), Axis::Row);
        assert_eq!(Direction::South.sweep_axis(), Axis::Row);
        assert_eq!(Direction::East.sweep_axis(), Axis::Col);
        assert_eq!(Direction::West.sweep_axis(), Axis::Col);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn wire_format_is_stable() {
        // The renderer matches on these exact strings.
        assert_eq!(serde_json::to_string(&TileColor::Aqua).unwrap(), "\"aqua\"");
        assert_eq!(
            serde_json::to_string(&Direction::North).unwrap(),
            "\"North\""
        );
        let input: PlayerInput = serde_json::from_str(
            "{\"Click\":{\"row\":4,\"col\":0}}",
        )
        .unwrap();
        assert_eq!(input, PlayerInput::Click { row: 4, col: 0 });
    }

    #[test]
    fn only_victory_is_not_a_loss() {
        assert!(!RoundOutcome::Victory.is_loss());
        assert!(RoundOutcome::NoStartingPosition.is_loss());
        assert!(
            RoundOutcome::RowSwept {
                direction: Direction::South
            }
            .is_loss()
        );
        assert!(RoundOutcome::StepsNotConsumed.is_loss());
        assert!(RoundOutcome::GoalNotReached.is_loss());
    }
}
