//! Core data records for the Knightfall round engine.
//!
//! These are the plain values the engine publishes to the renderer each
//! tick: grid coordinates, tiles, knight and player snapshots, the step
//! budget pair, and the per-tick update record.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Axis, Direction, RoundOutcome, RoundPhase, TileColor};

/// Side length of the (fixed) square board.
pub const GRID_SIZE: u8 = 5;

/// The center cell where the player spawns at round setup.
pub const CENTER: Coords = Coords { row: 2, col: 2 };

/// The distinguished goal tile the player must end the round on.
pub const GOAL: Coords = Coords { row: 0, col: 2 };

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A cell position on the board. Row 0 is the top row.
///
/// Both components are always within `[0, GRID_SIZE)`; construction paths
/// that could leave the board return `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coords {
    /// Row index (0 = top).
    pub row: u8,
    /// Column index (0 = left).
    pub col: u8,
}

impl Coords {
    /// Build a coordinate, returning `None` when either component falls
    /// outside the board.
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// The cell one step away in `direction`, or `None` when the step
    /// would leave the board.
    pub fn stepped(self, direction: Direction) -> Option<Self> {
        let (d_row, d_col) = direction.delta();
        let row = i16::from(self.row).checked_add(i16::from(d_row))?;
        let col = i16::from(self.col).checked_add(i16::from(d_col))?;
        let row = u8::try_from(row).ok()?;
        let col = u8::try_from(col).ok()?;
        Self::new(row, col)
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// One of the 25 board cells.
///
/// The base color is fixed at construction: the goal cell is aqua and the
/// rest follow a checkerboard rule. The explosion flags are transient
/// highlight state set while a swept line is lit and cleared exactly one
/// tick later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tile {
    /// Row index of this tile.
    pub row: u8,
    /// Column index of this tile.
    pub col: u8,
    /// Fixed base color.
    pub color: TileColor,
    /// Whether this tile's row is currently lit by a row sweep.
    pub exploding_row: bool,
    /// Whether this tile's column is currently lit by a column sweep.
    pub exploding_col: bool,
}

impl Tile {
    /// Build a tile with its checkerboard base color.
    ///
    /// The goal cell is aqua; otherwise tiles where exactly one of the
    /// row/column indices is even are black and the rest white.
    pub const fn new(row: u8, col: u8) -> Self {
        let color = if row == GOAL.row && col == GOAL.col {
            TileColor::Aqua
        } else if (row % 2 == 0) != (col % 2 == 0) {
            TileColor::Black
        } else {
            TileColor::White
        };
        Self {
            row,
            col,
            color,
            exploding_row: false,
            exploding_col: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Published view of one knight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct KnightSnapshot {
    /// The direction this knight walks.
    pub direction: Direction,
    /// The axis it sweeps (derived from the direction).
    pub axis: Axis,
    /// The line index it will strike; `None` until the round is set up.
    pub target: Option<u8>,
    /// Whether the knight is armed and actively sweeping its line.
    pub ready: bool,
}

/// Published view of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSnapshot {
    /// Cell the player currently occupies.
    pub position: Coords,
    /// The safe anchor recorded at the start of the active movement
    /// window; `None` outside a window.
    pub starting_position: Option<Coords>,
    /// Step budget assigned for the current window.
    pub steps: u8,
    /// Steps still owed in the current window. Can go below zero when the
    /// player over-moves; the orchestrator judges that at window close.
    pub remaining_steps: i32,
    /// Set once a loss finalizes; stays `false` on the win path.
    pub failed: bool,
}

impl Default for PlayerSnapshot {
    /// A player at the center cell with no anchor and no steps owed.
    fn default() -> Self {
        Self {
            position: CENTER,
            starting_position: None,
            steps: 0,
            remaining_steps: 0,
            failed: false,
        }
    }
}

/// The two per-window step budgets, randomized once per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StepBudget {
    /// Budget for the first movement window.
    pub first: u8,
    /// Budget for the second movement window.
    pub second: u8,
}

/// Per-tick update record pushed to the renderer.
///
/// `status` is `None` on ticks where the phase machine has nothing new to
/// say; the previous message stays on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TickUpdate {
    /// The observed tick value `v` (skip offset applied).
    pub tick: u64,
    /// The phase this tick landed in.
    pub phase: RoundPhase,
    /// Phase-appropriate status line, when one was produced this tick.
    pub status: Option<String>,
    /// Terminal outcome, set on the tick that ended the round.
    pub outcome: Option<RoundOutcome>,
}
