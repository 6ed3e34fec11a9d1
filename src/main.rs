//! Grid Survival entry point
//!
//! Handles platform-specific initialization. In the browser it wires the
//! engine to DOM input, interval timers, audio and the SVG board. Natively
//! it plays one seeded headless session on a virtual clock.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;

    use grid_survival::Settings;
    use grid_survival::audio::{AudioManager, SoundEffect};
    use grid_survival::input::{self, Command};
    use grid_survival::render;
    use grid_survival::schedule::{Timer, TimerBackend, TimerPlan, Timers};
    use grid_survival::sim::{Engine, GameEvent};

    /// Game instance holding all state
    struct Game {
        engine: Engine,
        audio: AudioManager,
        settings: Settings,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::default();
            Self {
                engine: Engine::new(seed),
                audio: AudioManager::new(&settings),
                settings,
            }
        }

        /// Apply a player command; returns true when a new session started
        fn apply(&mut self, command: Command) -> bool {
            // Any user gesture may unlock audio
            self.audio.resume();

            match command {
                Command::Move(direction) => {
                    self.engine.request_move(direction);
                    false
                }
                Command::Restart => {
                    self.engine.initialize();
                    log::info!("Game restarted");
                    true
                }
                Command::ToggleMute => {
                    let muted = self.settings.toggle_mute();
                    self.audio.apply_settings(&self.settings);
                    log::info!("Sound {}", if muted { "off" } else { "on" });
                    false
                }
            }
        }

        /// Turn pending notifications into sounds
        fn play_events(&mut self) {
            for event in self.engine.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
                if let GameEvent::ItemsCollected { count, score } = event {
                    log::debug!("Collected {} (score {})", count, score);
                }
            }
        }

        fn timer_plan(&self) -> Option<TimerPlan> {
            TimerPlan::for_state(self.engine.snapshot())
        }

        /// Redraw board and HUD elements in DOM
        fn render(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.engine.snapshot();

            if let Some(el) = document.get_element_by_id("board") {
                el.set_inner_html(&render::board_svg(state));
            }
            if let Some(el) = document.get_element_by_id("score") {
                el.set_text_content(Some(&render::score_text(state)));
            }
            if let Some(el) = document.get_element_by_id("difficulty") {
                el.set_text_content(Some(&render::difficulty_text(state)));
            }

            // Show/hide game over
            if let Some(el) = document.get_element_by_id("game-over") {
                if state.game_over {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&render::final_score_text(state)));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    /// `setInterval`-backed timers
    ///
    /// Cancelled callbacks are parked in `retired` rather than dropped: a
    /// timer can cancel itself (an opponent step ending the game) while its
    /// closure is still on the stack.
    struct IntervalTimers {
        app: Weak<App>,
        live: HashMap<i32, Closure<dyn FnMut()>>,
        retired: Vec<Closure<dyn FnMut()>>,
    }

    impl IntervalTimers {
        fn new(app: Weak<App>) -> Self {
            Self {
                app,
                live: HashMap::new(),
                retired: Vec::new(),
            }
        }

        /// Free cancelled callbacks; only call at the start of a dispatch
        fn drop_retired(&mut self) {
            self.retired.clear();
        }
    }

    impl TimerBackend for IntervalTimers {
        type Handle = i32;

        fn start(&mut self, timer: Timer, period_ms: f64) -> Option<i32> {
            let app = self.app.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Some(app) = app.upgrade() {
                    App::on_timer(&app, timer);
                }
            });

            let window = web_sys::window()?;
            match window.set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms.round() as i32,
            ) {
                Ok(id) => {
                    self.live.insert(id, closure);
                    Some(id)
                }
                Err(e) => {
                    log::warn!("Failed to arm {:?} timer: {:?}", timer, e);
                    None
                }
            }
        }

        fn cancel(&mut self, handle: i32) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
            if let Some(closure) = self.live.remove(&handle) {
                self.retired.push(closure);
            }
        }
    }

    /// Everything the DOM callbacks share
    struct App {
        game: RefCell<Game>,
        timers: RefCell<Timers<IntervalTimers>>,
    }

    impl App {
        fn on_timer(app: &Rc<App>, timer: Timer) {
            app.timers.borrow_mut().backend_mut().drop_retired();

            let plan = {
                let mut game = app.game.borrow_mut();
                game.engine.fire(timer);
                game.play_events();
                game.timer_plan()
            };

            app.timers.borrow_mut().sync(plan);
            app.game.borrow().render();
        }

        fn on_command(app: &Rc<App>, command: Command) {
            app.timers.borrow_mut().backend_mut().drop_retired();

            let (plan, restarted) = {
                let mut game = app.game.borrow_mut();
                let restarted = game.apply(command);
                game.play_events();
                (game.timer_plan(), restarted)
            };

            {
                let mut timers = app.timers.borrow_mut();
                if restarted {
                    timers.restart(plan);
                } else {
                    timers.sync(plan);
                }
            }
            app.game.borrow().render();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Grid Survival starting...");

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new_cyclic(|weak: &Weak<App>| App {
            game: RefCell::new(Game::new(seed)),
            timers: RefCell::new(Timers::new(IntervalTimers::new(weak.clone()))),
        });
        log::info!("Game initialized with seed: {}", seed);

        let plan = app.game.borrow().timer_plan();
        app.timers.borrow_mut().restart(plan);
        app.game.borrow().render();

        setup_input_handlers(&app);
        setup_auto_mute(&app);

        log::info!("Grid Survival running!");
    }

    fn setup_input_handlers(app: &Rc<App>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let game_over = app.game.borrow().engine.is_game_over();
                if let Some(command) = input::command_for_key(&event.key(), game_over) {
                    // Keep arrow keys from scrolling the page
                    event.prevent_default();
                    App::on_command(&app, command);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen buttons
        let Some(document) = window.document() else {
            return;
        };
        for (id, command) in input::BUTTONS {
            let Some(el) = document.get_element_by_id(id) else {
                log::warn!("Missing control #{}", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                App::on_command(&app, command);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Silence audio while the window is in the background
    fn setup_auto_mute(app: &Rc<App>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let game = app.game.borrow();
                if game.settings.mute_on_blur {
                    game.audio.suspend();
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.game.borrow().audio.resume();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Grid Survival (native) starting...");
    log::info!("Native mode plays a headless demo - run with `trunk serve` for the web version");

    headless::run(HEADLESS_SEED, HEADLESS_LIMIT_MS);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_SEED: u64 = 2024;
/// Ten virtual minutes
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_LIMIT_MS: f64 = 600_000.0;

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use grid_survival::schedule::{TimerPlan, Timers, VirtualClock};
    use grid_survival::sim::{Direction, Engine, GameEvent, GameState, Position};

    /// Autopilot decision period (virtual ms)
    const STEP_MS: f64 = 400.0;

    /// Play one session with the autopilot until caught or out of time
    pub fn run(seed: u64, limit_ms: f64) {
        let mut engine = Engine::new(seed);
        let mut timers = Timers::new(VirtualClock::new());
        timers.restart(TimerPlan::for_state(engine.snapshot()));
        log::info!("Headless session with seed: {}", seed);

        let mut now = 0.0;
        while now < limit_ms && !engine.is_game_over() {
            now += STEP_MS;

            while let Some(timer) = timers.backend_mut().pop_due(now) {
                engine.fire(timer);
                timers.sync(TimerPlan::for_state(engine.snapshot()));
            }

            if let Some(direction) = autopilot(engine.snapshot()) {
                engine.request_move(direction);
                timers.sync(TimerPlan::for_state(engine.snapshot()));
            }

            for event in engine.drain_events() {
                match event {
                    GameEvent::ItemsCollected { count, score } => {
                        log::info!("[{:>6.0}ms] collected {} (score {})", now, count, score)
                    }
                    GameEvent::GameOver { score } => {
                        log::info!("[{:>6.0}ms] caught with score {}", now, score)
                    }
                    _ => {}
                }
            }
        }

        match serde_json::to_string_pretty(engine.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize final state: {}", e),
        }
    }

    /// Head for the nearest item, never stepping next to an opponent
    fn autopilot(state: &GameState) -> Option<Direction> {
        let target = state
            .items
            .iter()
            .min_by_key(|item| distance(**item, state.player))?;

        Direction::ALL
            .into_iter()
            .map(|dir| {
                let (dx, dy) = dir.delta();
                (dir, state.player.offset_clamped(dx, dy))
            })
            .filter(|(_, next)| *next != state.player)
            .filter(|(_, next)| state.opponents.iter().all(|o| distance(*o, *next) > 1))
            .min_by_key(|(_, next)| distance(*next, *target))
            .map(|(dir, _)| dir)
    }

    fn distance(a: Position, b: Position) -> i32 {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }
}
