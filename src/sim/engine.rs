//! Session driver: state plus its injected random source

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Direction, GameEvent, GameState};
use super::tick;
use crate::schedule::Timer;

/// Owns one [`GameState`] and the generator every random draw comes from
#[derive(Debug, Clone)]
pub struct Engine<R = Pcg32> {
    state: GameState,
    rng: R,
}

impl Engine<Pcg32> {
    /// Seeded engine (same seed, same session)
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    /// Engine drawing from a caller-supplied generator
    pub fn with_rng(mut rng: R) -> Self {
        let state = GameState::new(&mut rng);
        Self { state, rng }
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    /// Start a new session; the generator keeps its stream
    pub fn initialize(&mut self) {
        tick::initialize(&mut self.state, &mut self.rng);
    }

    pub fn request_move(&mut self, direction: Direction) {
        tick::request_move(&mut self.state, direction);
    }

    pub fn tick_opponents(&mut self) {
        tick::tick_opponents(&mut self.state, &mut self.rng);
    }

    pub fn tick_spawn_item(&mut self) {
        tick::tick_spawn_item(&mut self.state, &mut self.rng);
    }

    pub fn tick_difficulty(&mut self) {
        tick::tick_difficulty(&mut self.state, &mut self.rng);
    }

    /// Dispatch a timer firing to its transition
    pub fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::Opponents => self.tick_opponents(),
            Timer::ItemSpawn => self.tick_spawn_item(),
            Timer::Difficulty => self.tick_difficulty(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_over
    }

    /// Mutable access for contrived test setups
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Position;

    #[test]
    fn test_determinism() {
        // Two engines with the same seed should produce identical sessions
        let mut a = Engine::new(99999);
        let mut b = Engine::new(99999);

        let timers = [
            Timer::Opponents,
            Timer::ItemSpawn,
            Timer::Difficulty,
            Timer::Opponents,
            Timer::Difficulty,
        ];

        for timer in timers {
            a.fire(timer);
            b.fire(timer);
            a.request_move(Direction::Up);
            b.request_move(Direction::Up);
        }

        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_fire_dispatch() {
        let mut engine = Engine::new(1);
        engine.fire(Timer::ItemSpawn);
        // Dropped on the board, or straight under the player
        let state = engine.snapshot();
        assert_eq!(state.items.len() as u32 + state.score, 1);
        engine.fire(Timer::Difficulty);
        assert_eq!(engine.snapshot().difficulty_level, 2);
        assert_eq!(engine.snapshot().opponents.len(), 4);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut engine = Engine::new(2024);
        let player = engine.snapshot().player;
        engine.state_mut().opponents.push(Position::new(player.x, player.y - 1));

        engine.request_move(Direction::Up);
        assert!(engine.is_game_over());
        assert!(engine.drain_events().contains(&GameEvent::GameOver { score: 0 }));

        engine.initialize();
        let state = engine.snapshot();
        assert!(!state.game_over);
        assert_eq!(state.score, 0);
        assert_eq!(state.difficulty_level, 1);
        assert_eq!(state.player, Position::new(5, 5));
        assert_eq!(state.opponents.len(), 3);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_without_events() {
        let mut engine = Engine::new(5);
        engine.fire(Timer::Difficulty);
        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["difficulty_level"], 2);
        assert_eq!(json["player"]["x"], 5);
        assert!(json.get("events").is_none());
    }
}
