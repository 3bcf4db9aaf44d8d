//! Engine-level error type.

use knightfall_core::{ConfigError, SessionError};
use thiserror::Error;

/// Errors surfaced by the engine binary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration could not be loaded or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A round could not be started.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Reading the command stream failed.
    #[error("command stream error: {0}")]
    Io(#[from] std::io::Error),
}
