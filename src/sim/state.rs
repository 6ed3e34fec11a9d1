//! Game state and core simulation types
//!
//! Everything a renderer needs to draw one frame lives in [`GameState`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clamp_axis;
use crate::consts::*;

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Uniformly random cell
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            x: rng.random_range(0..GRID_SIZE),
            y: rng.random_range(0..GRID_SIZE),
        }
    }

    /// Offset by (dx, dy), saturating at the board edges
    pub fn offset_clamped(self, dx: i32, dy: i32) -> Self {
        Self {
            x: clamp_axis(self.x + dx),
            y: clamp_axis(self.y + dy),
        }
    }

    pub fn in_bounds(&self) -> bool {
        (0..GRID_SIZE).contains(&self.x) && (0..GRID_SIZE).contains(&self.y)
    }
}

/// Player move direction (screen coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset for this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Notifications produced by transitions, drained by the adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player move request accepted
    PlayerMoved,
    /// One or more items picked up in a single evaluation
    ItemsCollected { count: u32, score: u32 },
    /// Player and opponent share a cell
    GameOver { score: u32 },
    /// Difficulty tick applied
    DifficultyRaised { level: u32, opponent_added: bool },
}

/// Complete game state for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Player-controlled token
    pub player: Position,
    /// Wandering opponents, in slot order
    pub opponents: Vec<Position>,
    /// Uncollected items (duplicates allowed)
    pub items: Vec<Position>,
    pub score: u32,
    /// Starts at 1, never decreases within a session
    pub difficulty_level: u32,
    /// Latched on player/opponent collision
    pub game_over: bool,
    /// Pending notifications (not part of the snapshot)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh session: player centered, initial opponents scattered
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        let opponents = (0..INITIAL_OPPONENTS)
            .map(|_| Position::random(rng))
            .collect();

        Self {
            player: Position::new(PLAYER_START.0, PLAYER_START.1),
            opponents,
            items: Vec::new(),
            score: 0,
            difficulty_level: 1,
            game_over: false,
            events: Vec::new(),
        }
    }

    /// Take all pending notifications in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True if any opponent occupies the player's cell
    pub fn player_caught(&self) -> bool {
        self.opponents.iter().any(|o| *o == self.player)
    }
}
