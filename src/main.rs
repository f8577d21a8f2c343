//! Glyph Hunt entry point
//!
//! In the browser this binds the session to JS: the page's UI calls the
//! exported actions and reads back JSON snapshots, while an interval timer
//! pumps the session's timer queue. Natively it runs a headless auto-player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use glyph_hunt::platform::SystemClock;
    use glyph_hunt::sim::{GamePhase, GameSession, SessionEvent};
    use glyph_hunt::{HighScores, Settings, SettingsPatch};

    /// How often the session's timers are pumped (ms)
    const PUMP_INTERVAL_MS: i32 = 50;

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        high_scores: HighScores,
        /// Events not yet collected by the UI
        pending_events: Vec<SessionEvent>,
        last_rank: Option<usize>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                session: GameSession::new(Settings::load(), SystemClock, seed),
                high_scores: HighScores::load(),
                pending_events: Vec::new(),
                last_rank: None,
            }
        }

        /// Move session events to the UI queue, recording finished runs
        fn collect_events(&mut self) {
            for event in self.session.drain_events() {
                if let SessionEvent::GameOver { score } = event {
                    let summary = self.session.summary();
                    self.last_rank = self.high_scores.add_run(&summary, js_sys::Date::now());
                    if let Some(rank) = self.last_rank {
                        log::info!("Score {} ranked #{}", score, rank);
                        self.high_scores.save();
                    }
                }
                self.pending_events.push(event);
            }
        }
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    fn with_game<T>(f: impl FnOnce(&mut Game) -> T) -> Option<T> {
        let game = GAME.with(|g| g.borrow().clone())?;
        let mut g = game.borrow_mut();
        let out = f(&mut g);
        g.collect_events();
        Some(out)
    }

    #[wasm_bindgen]
    pub fn start_game() {
        with_game(|g| g.session.start());
    }

    #[wasm_bindgen]
    pub fn select_option(id: u32) {
        with_game(|g| g.session.select_option(id));
    }

    #[wasm_bindgen]
    pub fn pause_game() {
        with_game(|g| g.session.pause());
    }

    #[wasm_bindgen]
    pub fn resume_game() {
        with_game(|g| g.session.resume());
    }

    #[wasm_bindgen]
    pub fn stop_game() {
        with_game(|g| g.session.stop());
    }

    #[wasm_bindgen]
    pub fn restart_game() {
        with_game(|g| {
            g.session.restart();
            g.last_rank = None;
        });
    }

    /// Merge a partial settings object (JSON) and persist the result
    #[wasm_bindgen]
    pub fn update_settings(patch_json: &str) {
        match serde_json::from_str::<SettingsPatch>(patch_json) {
            Ok(patch) => {
                with_game(|g| {
                    g.session.update_settings(&patch);
                    for problem in g.session.settings().check() {
                        log::warn!("Settings problem: {problem}");
                    }
                    g.session.settings().save();
                });
            }
            Err(e) => log::warn!("Ignoring malformed settings patch: {e}"),
        }
    }

    /// Full session snapshot as JSON
    #[wasm_bindgen]
    pub fn game_state_json() -> String {
        with_game(|g| serde_json::to_string(&g.session.view()).unwrap_or_default()).unwrap_or_default()
    }

    /// Events since the last call, as a JSON array
    #[wasm_bindgen]
    pub fn drain_events_json() -> String {
        with_game(|g| {
            let events = std::mem::take(&mut g.pending_events);
            serde_json::to_string(&events).unwrap_or_default()
        })
        .unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn summary_json() -> String {
        with_game(|g| serde_json::to_string(&g.session.summary()).unwrap_or_default()).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn high_scores_json() -> String {
        with_game(|g| serde_json::to_string(&g.high_scores).unwrap_or_default()).unwrap_or_default()
    }

    /// Rank of the last finished run, 0 if it didn't place
    #[wasm_bindgen]
    pub fn last_rank() -> u32 {
        with_game(|g| g.last_rank.map_or(0, |r| r as u32)).unwrap_or(0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Glyph Hunt starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        GAME.with(|g| *g.borrow_mut() = Some(game.clone()));
        log::info!("Session initialized with seed: {}", seed);

        setup_timer_pump(game.clone());
        setup_auto_pause(game);

        log::info!("Glyph Hunt running!");
    }

    fn setup_timer_pump(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; timers will not run");
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut g = game.borrow_mut();
            if g.session.advance() > 0 {
                g.collect_events();
            }
        });
        if window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                PUMP_INTERVAL_MS,
            )
            .is_err()
        {
            log::error!("Failed to start timer pump");
        }
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if matches!(g.session.phase(), GamePhase::Warmup | GamePhase::Playing) {
                        g.session.pause();
                        g.collect_events();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if matches!(g.session.phase(), GamePhase::Warmup | GamePhase::Playing) {
                    g.session.pause();
                    g.collect_events();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
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
    log::info!("Glyph Hunt (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    use glyph_hunt::platform::{Clock, SystemClock};

    let seed = SystemClock.now_ms() as u64;
    let summary = demo::run(glyph_hunt::Settings::load(), seed);
    println!(
        "score {} | rounds {} | accuracy {:.0}% | mean reaction {}",
        summary.score,
        summary.rounds_completed,
        summary.accuracy,
        summary
            .mean_reaction_ms
            .map_or("n/a".to_string(), |ms| format!("{ms:.0} ms")),
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless auto-player against a hand-driven clock
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use glyph_hunt::consts::FEEDBACK_DELAY_MS;
    use glyph_hunt::platform::ManualClock;
    use glyph_hunt::sim::{GameSession, SessionEvent, SessionSummary};
    use glyph_hunt::{HighScores, Settings};

    /// Simulated frame step (ms)
    const STEP_MS: f64 = 50.0;
    /// Give up after this much simulated time
    const MAX_SIM_MS: f64 = 30.0 * 60.0 * 1000.0;
    /// Chance the bot clicks the right pair
    const BOT_ACCURACY: f64 = 0.85;

    pub fn run(settings: Settings, seed: u64) -> SessionSummary {
        let clock = ManualClock::new(0.0);
        let mut session = GameSession::new(settings, clock.clone(), seed);
        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5EED);
        let mut high_scores = HighScores::load();

        session.start();
        let mut elapsed = 0.0;
        let mut next_click_at = bot.random_range(300.0..900.0);

        while !session.is_game_over() && elapsed < MAX_SIM_MS {
            clock.advance(STEP_MS);
            elapsed += STEP_MS;
            session.advance();

            if !session.feedback().active && elapsed >= next_click_at {
                let want_correct = bot.random_bool(BOT_ACCURACY);
                let pick = session
                    .options()
                    .iter()
                    .find(|o| o.is_correct == want_correct)
                    .or_else(|| session.options().first())
                    .map(|o| o.id);
                if let Some(id) = pick {
                    session.select_option(id);
                }
                next_click_at = elapsed + FEEDBACK_DELAY_MS + bot.random_range(300.0..900.0);
            }

            for event in session.drain_events() {
                match event {
                    SessionEvent::RoundStarted { label, target } => {
                        log::info!("Round {label}: find {target}")
                    }
                    SessionEvent::GameOver { score } => log::info!("Game over with {score} points"),
                    _ => {}
                }
            }
        }

        let summary = session.summary();
        if let Some(rank) = high_scores.add_run(&summary, elapsed) {
            log::info!("Run ranked #{rank}");
            high_scores.save();
        }
        summary
    }
}
