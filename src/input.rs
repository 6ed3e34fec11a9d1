//! Keyboard and button mapping
//!
//! Translates raw DOM identifiers into commands; the browser entry point
//! applies them to the engine.

use crate::sim::Direction;

/// A player intent from the keyboard or an on-screen control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Restart,
    ToggleMute,
}

/// Map a `KeyboardEvent.key` value
///
/// Enter only restarts once the game is over.
pub fn command_for_key(key: &str, game_over: bool) -> Option<Command> {
    match key {
        "ArrowUp" => Some(Command::Move(Direction::Up)),
        "ArrowDown" => Some(Command::Move(Direction::Down)),
        "ArrowLeft" => Some(Command::Move(Direction::Left)),
        "ArrowRight" => Some(Command::Move(Direction::Right)),
        "m" | "M" => Some(Command::ToggleMute),
        "Enter" if game_over => Some(Command::Restart),
        _ => None,
    }
}

/// On-screen controls: element id and the command it sends
pub const BUTTONS: [(&str, Command); 5] = [
    ("btn-up", Command::Move(Direction::Up)),
    ("btn-left", Command::Move(Direction::Left)),
    ("btn-right", Command::Move(Direction::Right)),
    ("btn-down", Command::Move(Direction::Down)),
    ("restart-btn", Command::Restart),
];
