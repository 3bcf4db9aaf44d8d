//! Engine binary for Knightfall.
//!
//! Runs the round engine headlessly: rounds are started and played over
//! a line-based command protocol on stdin, and the session's published
//! streams are echoed to stdout. A graphical frontend subscribes to the
//! same streams through [`knightfall_core::GameSession`]; this binary is
//! the reference wiring.
//!
//! # Startup sequence
//!
//! 1. Load configuration from `knightfall-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the game session and subscribe to its streams
//! 4. Start the first round
//! 5. Read commands from stdin until `quit` or end of stream

mod error;
mod input;

use std::path::Path;

use knightfall_core::{GameConfig, GameSession, SessionSubscriptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::input::EngineCommand;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration loading, round startup, or the
/// command stream fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!(
        seed = config.round.seed,
        speed_multiplier = config.round.speed_multiplier,
        "knightfall-engine starting"
    );

    // 3. Create the session and mirror its streams to stdout.
    let mut session = GameSession::new(config.round);
    let printer = tokio::spawn(echo_streams(session.subscriptions()));

    // 4. First round starts immediately on the configured speed.
    session.start_round(None).await.map_err(EngineError::from)?;

    // 5. Command loop.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(EngineError::from)? {
        match input::parse_command(&line) {
            Some(EngineCommand::Start { speed }) => {
                session.start_round(speed).await.map_err(EngineError::from)?;
            }
            Some(EngineCommand::Input(event)) => session.send_input(event),
            Some(EngineCommand::Quit) => break,
            None => {}
        }
    }

    session.cancel_active().await;
    printer.abort();
    info!("knightfall-engine shutdown complete");
    Ok(())
}

/// Echo status lines and terminal outcomes from the session's streams.
///
/// Runs until aborted at shutdown; `changed` only fails once the session
/// (and with it every sender) is gone.
async fn echo_streams(mut subs: SessionSubscriptions) {
    loop {
        tokio::select! {
            changed = subs.status.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = subs.status.borrow_and_update().clone();
                if !status.is_empty() {
                    println!("{status}");
                }
            }
            changed = subs.outcome.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(outcome) = *subs.outcome.borrow_and_update() {
                    info!(?outcome, "Round over");
                }
            }
        }
    }
}

/// Load the game configuration from `knightfall-config.yaml`.
///
/// A missing file is not an error; defaults give a playable round.
fn load_config() -> Result<GameConfig, EngineError> {
    let config_path = Path::new("knightfall-config.yaml");
    if config_path.exists() {
        Ok(GameConfig::from_file(config_path)?)
    } else {
        Ok(GameConfig::default())
    }
}
