//! Line-based command parsing for the engine's stdin protocol.
//!
//! One command per line, whitespace-separated, case-insensitive.
//! Unrecognized or malformed lines parse to `None` and are silently
//! ignored by the caller, matching the round engine's own policy of
//! dropping out-of-phase input rather than erroring.

use knightfall_types::{Direction, PlayerInput};

/// A parsed command from the engine's command stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineCommand {
    /// Start a new round, optionally overriding the speed multiplier.
    Start {
        /// Speed multiplier for this round only.
        speed: Option<f64>,
    },
    /// Forward a raw input event to the active round.
    Input(PlayerInput),
    /// Stop the active round and exit.
    Quit,
}

/// Parse one command line. Returns `None` for empty, unknown, or
/// malformed lines.
pub fn parse_command(line: &str) -> Option<EngineCommand> {
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next()?.to_ascii_lowercase();

    let command = match keyword.as_str() {
        "start" => {
            let speed = match tokens.next() {
                Some(raw) => Some(raw.parse::<f64>().ok()?),
                None => None,
            };
            EngineCommand::Start { speed }
        }
        "click" => {
            let row = tokens.next()?.parse::<u8>().ok()?;
            let col = tokens.next()?.parse::<u8>().ok()?;
            EngineCommand::Input(PlayerInput::Click { row, col })
        }
        "up" | "w" => EngineCommand::Input(PlayerInput::Step(Direction::North)),
        "down" | "s" => EngineCommand::Input(PlayerInput::Step(Direction::South)),
        "left" | "a" => EngineCommand::Input(PlayerInput::Step(Direction::West)),
        "right" | "d" => EngineCommand::Input(PlayerInput::Step(Direction::East)),
        "skip" => EngineCommand::Input(PlayerInput::Skip),
        "quit" | "exit" | "q" => EngineCommand::Quit,
        _ => return None,
    };

    // Trailing junk after a complete command invalidates the line.
    if tokens.next().is_some() {
        return None;
    }
    Some(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_map_to_steps() {
        assert_eq!(
            parse_command("w"),
            Some(EngineCommand::Input(PlayerInput::Step(Direction::North)))
        );
        assert_eq!(
            parse_command("RIGHT"),
            Some(EngineCommand::Input(PlayerInput::Step(Direction::East)))
        );
    }

    #[test]
    fn click_requires_two_coordinates() {
        assert_eq!(
            parse_command("click 4 0"),
            Some(EngineCommand::Input(PlayerInput::Click { row: 4, col: 0 }))
        );
        assert_eq!(parse_command("click 4"), None);
        assert_eq!(parse_command("click four zero"), None);
    }

    #[test]
    fn start_takes_an_optional_speed() {
        assert_eq!(parse_command("start"), Some(EngineCommand::Start { speed: None }));
        assert_eq!(
            parse_command("start 2.5"),
            Some(EngineCommand::Start { speed: Some(2.5) })
        );
        assert_eq!(parse_command("start fast"), None);
    }

    #[test]
    fn unknown_and_empty_lines_are_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command("skip extra"), None);
    }
}
