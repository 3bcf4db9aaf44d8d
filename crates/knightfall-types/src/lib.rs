//! Shared type definitions for the Knightfall round engine.
//!
//! This crate is the single source of truth for the values that cross the
//! engine boundary. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the grid renderer.
//!
//! # Modules
//!
//! - [`enums`] -- directions, axes, tile colors, phases, outcomes, input
//! - [`structs`] -- coordinates, tiles, and the published snapshot records

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Axis, Direction, PlayerInput, RoundOutcome, RoundPhase, TileColor};
pub use structs::{
    CENTER, Coords, GOAL, GRID_SIZE, KnightSnapshot, PlayerSnapshot, StepBudget, Tile, TickUpdate,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // Enums
        let _ = crate::enums::Direction::export_all();
        let _ = crate::enums::Axis::export_all();
        let _ = crate::enums::TileColor::export_all();
        let _ = crate::enums::RoundPhase::export_all();
        let _ = crate::enums::RoundOutcome::export_all();
        let _ = crate::enums::PlayerInput::export_all();

        // Structs
        let _ = crate::structs::Coords::export_all();
        let _ = crate::structs::Tile::export_all();
        let _ = crate::structs::KnightSnapshot::export_all();
        let _ = crate::structs::PlayerSnapshot::export_all();
        let _ = crate::structs::StepBudget::export_all();
        let _ = crate::structs::TickUpdate::export_all();
    }
}
