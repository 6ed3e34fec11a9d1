//! State transitions
//!
//! One function per event kind. Each runs to completion on a single
//! `&mut GameState`, so no caller can observe a half-applied update.

use rand::Rng;

use super::state::{Direction, GameEvent, GameState, Position};
use crate::consts::*;

/// Reset to session start, discarding the previous state
pub fn initialize<R: Rng>(state: &mut GameState, rng: &mut R) {
    *state = GameState::new(rng);
}

/// Move the player one cell, then resolve contacts before returning
pub fn request_move(state: &mut GameState, direction: Direction) {
    if state.game_over {
        return;
    }

    let (dx, dy) = direction.delta();
    state.player = state.player.offset_clamped(dx, dy);
    state.events.push(GameEvent::PlayerMoved);

    resolve_contacts(state);
}

/// Collision and collection check at the player's cell
///
/// Both checks always run; a move can collect items and end the game at once.
pub fn resolve_contacts(state: &mut GameState) {
    if !state.game_over && state.player_caught() {
        state.game_over = true;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over with score {}", state.score);
    }

    let player = state.player;
    let before = state.items.len();
    state.items.retain(|item| *item != player);
    let collected = (before - state.items.len()) as u32;

    if collected > 0 {
        state.score += collected;
        state.events.push(GameEvent::ItemsCollected {
            count: collected,
            score: state.score,
        });
    }
}

/// Random-walk every opponent one step on each axis
pub fn tick_opponents<R: Rng>(state: &mut GameState, rng: &mut R) {
    if state.game_over {
        return;
    }

    for opponent in &mut state.opponents {
        let dx = rng.random_range(-1..=1);
        let dy = rng.random_range(-1..=1);
        *opponent = opponent.offset_clamped(dx, dy);
    }

    // An opponent walking onto the player counts as a catch too
    resolve_contacts(state);
}

/// Drop one item on a random cell
///
/// An item landing under the player is picked up at once. Not gated on game
/// over; after it only the item list changes.
pub fn tick_spawn_item<R: Rng>(state: &mut GameState, rng: &mut R) {
    state.items.push(Position::random(rng));

    if !state.game_over {
        resolve_contacts(state);
    }
}

/// Raise difficulty by one; every even level adds an opponent until the cap
pub fn tick_difficulty<R: Rng>(state: &mut GameState, rng: &mut R) {
    state.difficulty_level += 1;
    let level = state.difficulty_level;

    let opponent_added = level % 2 == 0 && state.opponents.len() < MAX_OPPONENTS;
    if opponent_added {
        state.opponents.push(Position::random(rng));
    }

    state.events.push(GameEvent::DifficultyRaised {
        level,
        opponent_added,
    });
    log::info!(
        "Difficulty {} ({} opponents)",
        level,
        state.opponents.len()
    );

    // A new opponent may appear right on the player
    if !state.game_over {
        resolve_contacts(state);
    }
}
