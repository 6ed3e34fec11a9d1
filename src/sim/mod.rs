//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, injected by the caller
//! - Stable iteration order (opponent slot order)
//! - No rendering, timer or platform dependencies

pub mod engine;
pub mod state;
pub mod tick;

pub use engine::Engine;
pub use state::{Direction, GameEvent, GameState, Position};
pub use tick::{
    initialize, request_move, resolve_contacts, tick_difficulty, tick_opponents, tick_spawn_item,
};
