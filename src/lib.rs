//! Grid Survival - dodge the wanderers, grab the loot
//!
//! Core modules:
//! - `sim`: Deterministic game state and its transitions
//! - `schedule`: Periodic timers derived from game state
//! - `render`: SVG board and HUD text
//! - `input`: Keyboard/button mapping
//! - `audio`: Procedural sound effects (Web Audio)

pub mod audio;
pub mod input;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Cells per side of the square board
    pub const GRID_SIZE: i32 = 10;
    /// Rendered size of one cell in pixels
    pub const CELL_SIZE: i32 = 40;

    /// Player spawn cell
    pub const PLAYER_START: (i32, i32) = (5, 5);

    /// Opponents present at session start
    pub const INITIAL_OPPONENTS: usize = 3;
    /// Opponent cap reached through difficulty growth
    pub const MAX_OPPONENTS: usize = 5;

    /// Opponent walk period at difficulty 1 (ms), scaled by 1/sqrt(level)
    pub const OPPONENT_MOVE_INTERVAL: f64 = 1000.0;
    /// Item spawn period (ms)
    pub const ITEM_SPAWN_INTERVAL: f64 = 3000.0;
    /// Difficulty increase period (ms)
    pub const DIFFICULTY_INCREASE_INTERVAL: f64 = 10000.0;
}

/// Clamp a coordinate to the board, saturating at the edges
#[inline]
pub fn clamp_axis(v: i32) -> i32 {
    v.clamp(0, consts::GRID_SIZE - 1)
}
