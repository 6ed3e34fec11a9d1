//! Periodic timers driving the non-player transitions
//!
//! The set of timers that should be running is pure data ([`TimerPlan`])
//! derived from the game state. [`Timers`] reconciles armed timers against
//! a plan through a [`TimerBackend`]: browser intervals in the binary, a
//! virtual clock in headless runs and tests.

use crate::consts::*;
use crate::sim::GameState;

/// The three periodic schedulers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    Opponents,
    ItemSpawn,
    Difficulty,
}

impl Timer {
    pub const ALL: [Timer; 3] = [Timer::Opponents, Timer::ItemSpawn, Timer::Difficulty];

    fn slot(self) -> usize {
        match self {
            Timer::Opponents => 0,
            Timer::ItemSpawn => 1,
            Timer::Difficulty => 2,
        }
    }
}

/// Opponent walk period for a difficulty level: shrinks with 1/sqrt(level)
pub fn opponent_interval_ms(level: u32) -> f64 {
    OPPONENT_MOVE_INTERVAL / f64::from(level.max(1)).sqrt()
}

/// Desired period (ms) of every timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerPlan {
    pub opponents_ms: f64,
    pub item_spawn_ms: f64,
    pub difficulty_ms: f64,
}

impl TimerPlan {
    /// Plan for a state; `None` once the game is over (nothing may run)
    pub fn for_state(state: &GameState) -> Option<Self> {
        if state.game_over {
            return None;
        }
        Some(Self {
            opponents_ms: opponent_interval_ms(state.difficulty_level),
            item_spawn_ms: ITEM_SPAWN_INTERVAL,
            difficulty_ms: DIFFICULTY_INCREASE_INTERVAL,
        })
    }

    pub fn period(&self, timer: Timer) -> f64 {
        match timer {
            Timer::Opponents => self.opponents_ms,
            Timer::ItemSpawn => self.item_spawn_ms,
            Timer::Difficulty => self.difficulty_ms,
        }
    }
}

/// Something that can run a repeating callback and cancel it
pub trait TimerBackend {
    type Handle;

    /// Arm a repeating timer firing every `period_ms`; `None` if it could not
    /// be armed
    fn start(&mut self, timer: Timer, period_ms: f64) -> Option<Self::Handle>;

    /// Cancel an armed timer; it must not fire again
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
struct Armed<H> {
    handle: H,
    period_ms: f64,
}

/// Armed timers reconciled against a [`TimerPlan`]
pub struct Timers<B: TimerBackend> {
    backend: B,
    armed: [Option<Armed<B::Handle>>; 3],
}

impl<B: TimerBackend> Timers<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            armed: [None, None, None],
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Period of an armed timer
    pub fn armed_period(&self, timer: Timer) -> Option<f64> {
        self.armed[timer.slot()].as_ref().map(|a| a.period_ms)
    }

    pub fn is_idle(&self) -> bool {
        self.armed.iter().all(Option::is_none)
    }

    /// Bring armed timers in line with `plan`
    ///
    /// `None` cancels everything. A timer whose period changed is cancelled
    /// and started again, so the new period applies from its next firing.
    /// A timer the backend fails to arm stays unarmed and is retried on the
    /// next sync.
    pub fn sync(&mut self, plan: Option<TimerPlan>) {
        let Some(plan) = plan else {
            self.cancel_all();
            return;
        };

        for timer in Timer::ALL {
            let period_ms = plan.period(timer);
            let slot = timer.slot();

            let unchanged = matches!(&self.armed[slot], Some(a) if a.period_ms == period_ms);
            if unchanged {
                continue;
            }

            if let Some(old) = self.armed[slot].take() {
                log::debug!("Re-arming {:?} timer at {:.0}ms", timer, period_ms);
                self.backend.cancel(old.handle);
            }
            self.armed[slot] = self
                .backend
                .start(timer, period_ms)
                .map(|handle| Armed { handle, period_ms });
        }
    }

    /// Cancel everything, then arm fresh timers for `plan`
    pub fn restart(&mut self, plan: Option<TimerPlan>) {
        self.cancel_all();
        self.sync(plan);
    }

    pub fn cancel_all(&mut self) {
        for slot in &mut self.armed {
            if let Some(armed) = slot.take() {
                self.backend.cancel(armed.handle);
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    handle: u64,
    timer: Timer,
    period_ms: f64,
    next_due: f64,
}

/// Deterministic in-memory clock for headless sessions and tests
#[derive(Debug, Default)]
pub struct VirtualClock {
    now_ms: f64,
    next_handle: u64,
    pending: Vec<Pending>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of armed timers
    pub fn armed_count(&self) -> usize {
        self.pending.len()
    }

    /// Next timer due at or before `until_ms`, advancing the clock to it
    ///
    /// Earliest due fires first; ties go to the timer armed first. When
    /// nothing is due the clock moves to `until_ms`.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<Timer> {
        let next = self
            .pending
            .iter_mut()
            .filter(|p| p.next_due <= until_ms)
            .min_by(|a, b| {
                a.next_due
                    .total_cmp(&b.next_due)
                    .then(a.handle.cmp(&b.handle))
            });

        match next {
            Some(p) => {
                self.now_ms = p.next_due;
                p.next_due += p.period_ms;
                Some(p.timer)
            }
            None => {
                self.now_ms = self.now_ms.max(until_ms);
                None
            }
        }
    }
}

impl TimerBackend for VirtualClock {
    type Handle = u64;

    fn start(&mut self, timer: Timer, period_ms: f64) -> Option<u64> {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            timer,
            period_ms,
            next_due: self.now_ms + period_ms,
        });
        Some(handle)
    }

    fn cancel(&mut self, handle: u64) {
        self.pending.retain(|p| p.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Engine;

    /// Backend that only records what it was asked to do
    #[derive(Debug, Default)]
    struct Recorder {
        started: Vec<(Timer, f64)>,
        cancelled: Vec<usize>,
        /// Refuse this many start requests before accepting any
        refuse: usize,
    }

    impl TimerBackend for Recorder {
        type Handle = usize;

        fn start(&mut self, timer: Timer, period_ms: f64) -> Option<usize> {
            if self.refuse > 0 {
                self.refuse -= 1;
                return None;
            }
            self.started.push((timer, period_ms));
            Some(self.started.len() - 1)
        }

        fn cancel(&mut self, handle: usize) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn test_opponent_interval_scaling() {
        assert_eq!(opponent_interval_ms(1), 1000.0);
        assert_eq!(opponent_interval_ms(4), 500.0);
        assert!(opponent_interval_ms(3) < opponent_interval_ms(2));
    }

    #[test]
    fn test_sync_arms_all_timers_once() {
        let engine = Engine::new(1);
        let mut timers = Timers::new(Recorder::default());

        timers.sync(TimerPlan::for_state(engine.snapshot()));
        timers.sync(TimerPlan::for_state(engine.snapshot()));

        assert_eq!(
            timers.backend().started,
            vec![
                (Timer::Opponents, 1000.0),
                (Timer::ItemSpawn, 3000.0),
                (Timer::Difficulty, 10000.0)
            ]
        );
        assert!(timers.backend().cancelled.is_empty());
    }

    #[test]
    fn test_difficulty_rearms_only_opponent_timer() {
        let mut engine = Engine::new(1);
        let mut timers = Timers::new(Recorder::default());
        timers.sync(TimerPlan::for_state(engine.snapshot()));

        engine.state_mut().difficulty_level = 2;
        timers.sync(TimerPlan::for_state(engine.snapshot()));

        let recorder = timers.backend();
        assert_eq!(recorder.cancelled, vec![0]);
        assert_eq!(recorder.started.len(), 4);
        assert_eq!(recorder.started[3].0, Timer::Opponents);
        assert_eq!(timers.armed_period(Timer::Opponents), Some(opponent_interval_ms(2)));
        assert_eq!(timers.armed_period(Timer::ItemSpawn), Some(ITEM_SPAWN_INTERVAL));
    }

    #[test]
    fn test_game_over_cancels_everything() {
        let mut engine = Engine::new(1);
        let mut timers = Timers::new(Recorder::default());
        timers.sync(TimerPlan::for_state(engine.snapshot()));

        let player = engine.snapshot().player;
        engine.state_mut().opponents.push(player);
        crate::sim::resolve_contacts(engine.state_mut());
        assert!(engine.is_game_over());

        timers.sync(TimerPlan::for_state(engine.snapshot()));
        assert!(timers.is_idle());
        let mut cancelled = timers.backend().cancelled.clone();
        cancelled.sort();
        assert_eq!(cancelled, vec![0, 1, 2]);
    }

    #[test]
    fn test_failed_start_is_retried() {
        let engine = Engine::new(1);
        let mut timers = Timers::new(Recorder {
            refuse: 1,
            ..Recorder::default()
        });

        timers.sync(TimerPlan::for_state(engine.snapshot()));
        assert_eq!(timers.armed_period(Timer::Opponents), None);
        assert_eq!(timers.armed_period(Timer::ItemSpawn), Some(ITEM_SPAWN_INTERVAL));
        assert_eq!(timers.backend().started.len(), 2);

        timers.sync(TimerPlan::for_state(engine.snapshot()));
        assert_eq!(timers.armed_period(Timer::Opponents), Some(OPPONENT_MOVE_INTERVAL));
        assert_eq!(timers.backend().started.len(), 3);
        assert_eq!(timers.backend().started[2].0, Timer::Opponents);

        // Nothing was armed in the slot, so there was nothing to cancel
        assert!(timers.backend().cancelled.is_empty());
    }

    #[test]
    fn test_restart_rearms_fresh() {
        let engine = Engine::new(1);
        let mut timers = Timers::new(Recorder::default());
        timers.sync(TimerPlan::for_state(engine.snapshot()));
        timers.restart(TimerPlan::for_state(engine.snapshot()));

        assert_eq!(timers.backend().started.len(), 6);
        assert_eq!(timers.backend().cancelled.len(), 3);
    }

    #[test]
    fn test_virtual_clock_order() {
        let mut clock = VirtualClock::new();
        clock.start(Timer::ItemSpawn, 3000.0);
        clock.start(Timer::Opponents, 1000.0);

        let mut fired = Vec::new();
        while let Some(timer) = clock.pop_due(3000.0) {
            fired.push((timer, clock.now_ms()));
        }

        assert_eq!(
            fired,
            vec![
                (Timer::Opponents, 1000.0),
                (Timer::Opponents, 2000.0),
                (Timer::ItemSpawn, 3000.0),
                (Timer::Opponents, 3000.0),
            ]
        );
        assert_eq!(clock.now_ms(), 3000.0);
    }

    #[test]
    fn test_virtual_clock_cancelled_never_fires() {
        let mut clock = VirtualClock::new();
        let handle = clock.start(Timer::Difficulty, 100.0).unwrap();
        assert_eq!(clock.pop_due(100.0), Some(Timer::Difficulty));

        clock.cancel(handle);
        assert_eq!(clock.armed_count(), 0);
        assert_eq!(clock.pop_due(10_000.0), None);
    }

    #[test]
    fn test_headless_session_freezes_timers_on_game_over() {
        let mut engine = Engine::new(77);
        let mut timers = Timers::new(VirtualClock::new());
        timers.sync(TimerPlan::for_state(engine.snapshot()));

        // The player stands still; sooner or later an opponent wanders onto it
        let mut guard = 0;
        while !engine.is_game_over() && guard < 100_000 {
            let until = timers.backend().now_ms() + 1000.0;
            while let Some(timer) = timers.backend_mut().pop_due(until) {
                engine.fire(timer);
                timers.sync(TimerPlan::for_state(engine.snapshot()));
            }
            guard += 1;
        }

        assert!(engine.is_game_over());
        assert_eq!(timers.backend().armed_count(), 0);
        assert!(timers.is_idle());
    }
}
