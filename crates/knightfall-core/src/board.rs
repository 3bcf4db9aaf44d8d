//! The board: a 5x5 grid of tiles with transient explosion highlights.
//!
//! The board is rebuilt fresh at the start of every round. Base colors are
//! fixed at construction (checkerboard plus the aqua goal tile); the
//! explosion flags are set when a swept line fires and cleared by the
//! orchestrator exactly one tick later.

use knightfall_types::{Coords, GRID_SIZE, Tile};

/// The 5x5 tile grid for one round.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    /// Row-major tile storage.
    tiles: Vec<Vec<Tile>>,
}

impl Board {
    /// Build a fresh board with base colors and no highlights.
    pub fn new() -> Self {
        let tiles = (0..GRID_SIZE)
            .map(|row| (0..GRID_SIZE).map(|col| Tile::new(row, col)).collect())
            .collect();
        Self { tiles }
    }

    /// Look up a tile by position.
    pub fn tile(&self, at: Coords) -> Option<&Tile> {
        self.tiles
            .get(usize::from(at.row))
            .and_then(|row| row.get(usize::from(at.col)))
    }

    /// Light every tile whose row matches one of the target lines.
    ///
    /// Tiles outside the targets have their row highlight cleared, so a
    /// stale flag can never survive a new sweep.
    pub fn set_row_explosions(&mut self, targets: &[u8]) {
        for row in &mut self.tiles {
            for tile in row {
                tile.exploding_row = targets.contains(&tile.row);
            }
        }
    }

    /// Light every tile whose column matches one of the target lines.
    pub fn set_col_explosions(&mut self, targets: &[u8]) {
        for row in &mut self.tiles {
            for tile in row {
                tile.exploding_col = targets.contains(&tile.col);
            }
        }
    }

    /// Clear all row highlights, unconditionally.
    pub fn clear_row_explosions(&mut self) {
        for row in &mut self.tiles {
            for tile in row {
                tile.exploding_row = false;
            }
        }
    }

    /// Clear all column highlights, unconditionally.
    pub fn clear_col_explosions(&mut self) {
        for row in &mut self.tiles {
            for tile in row {
                tile.exploding_col = false;
            }
        }
    }

    /// Clear every highlight on the board (terminal cleanup).
    pub fn clear_all_explosions(&mut self) {
        self.clear_row_explosions();
        self.clear_col_explosions();
    }

    /// Published copy of the grid.
    pub fn snapshot(&self) -> Vec<Vec<Tile>> {
        self.tiles.clone()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
