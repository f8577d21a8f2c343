//! Game session state machine
//!
//! `idle → warmup → playing → gameOver`, with `paused` reachable from warmup
//! or playing. Every action called from a phase it doesn't apply to is a
//! silent no-op. Deferred work (option moves, the feedback window) runs off
//! the session's own timer queue, pumped by the host through [`GameSession::advance`].

use super::grid::Grid;
use super::round;
use super::state::{
    ClickRecord, Feedback, GameOption, GamePhase, RngState, RoundLabel, RoundResult,
    SessionEvent, SessionSummary, SessionView,
};
use super::timer::{TimerId, TimerTask, Timers};
use crate::consts::{FEEDBACK_DELAY_MS, SCORE_PER_HIT};
use crate::platform::Clock;
use crate::settings::{Settings, SettingsPatch};

/// Upper bound on timers fired per `advance` call (a backgrounded tab can
/// come back with a long backlog of move ticks)
pub const MAX_TIMER_FIRES: usize = 64;

/// One player's game session
pub struct GameSession {
    settings: Settings,
    clock: Box<dyn Clock>,
    rng: RngState,

    phase: GamePhase,
    /// Phase to return to on resume
    prior_phase: Option<GamePhase>,

    target: String,
    options: Vec<GameOption>,
    grid: Grid,
    next_option_id: u32,

    score: u64,
    /// Scored round index (1-based once playing)
    round: u32,
    /// Warmup rounds started so far
    warmup_completed: u32,

    feedback: Feedback,
    round_started_ms: f64,
    click_history: Vec<ClickRecord>,
    round_results: Vec<RoundResult>,

    timers: Timers,
    move_timer: Option<TimerId>,
    /// Bumped on start/stop/restart; stale one-shot timers carry an old value
    epoch: u32,
    /// Round advance that came due while paused
    advance_on_resume: bool,

    events: Vec<SessionEvent>,
}

impl GameSession {
    /// Create an idle session. Settings are owned by the session from here on.
    pub fn new(settings: Settings, clock: impl Clock + 'static, seed: u64) -> Self {
        Self {
            settings,
            clock: Box::new(clock),
            rng: RngState::new(seed),
            phase: GamePhase::Idle,
            prior_phase: None,
            target: String::new(),
            options: Vec::new(),
            grid: Grid::default(),
            next_option_id: 0,
            score: 0,
            round: 0,
            warmup_completed: 0,
            feedback: Feedback::default(),
            round_started_ms: 0.0,
            click_history: Vec::new(),
            round_results: Vec::new(),
            timers: Timers::new(),
            move_timer: None,
            epoch: 0,
            advance_on_resume: false,
            events: Vec::new(),
        }
    }

    // === Actions ===

    /// Begin a run from idle: warmup first if enabled, otherwise straight to play
    pub fn start(&mut self) {
        if self.phase != GamePhase::Idle {
            return;
        }
        let now = self.clock.now_ms();

        self.reset_progress();
        self.clear_move_timer();
        self.epoch = self.epoch.wrapping_add(1);

        let first = if self.settings.warmup_enabled {
            GamePhase::Warmup
        } else {
            GamePhase::Playing
        };
        log::info!("Starting game (seed {}) in {:?}", self.rng.seed, first);
        self.set_phase(first);
        self.generate_round(now);
        self.start_move_timer(now);
    }

    /// Handle a click on option `id`
    pub fn select_option(&mut self, id: u32) {
        if self.feedback.active || !self.phase.is_active() {
            return;
        }
        let Some(option) = self.options.iter().find(|o| o.id == id) else {
            log::debug!("Ignoring selection of unknown option {id}");
            return;
        };
        let correct = option.is_correct;
        let letters = option.letters.clone();

        let now = self.clock.now_ms();
        let elapsed_ms = (now - self.round_started_ms).max(0.0).round() as u64;
        let playing = self.phase == GamePhase::Playing;

        let label = if playing {
            RoundLabel::Round(self.round.max(1))
        } else {
            RoundLabel::Warmup(self.warmup_completed.max(1))
        };
        self.click_history.push(ClickRecord {
            round: label,
            letters: letters.clone(),
            correct,
            elapsed_ms,
        });

        if correct && playing {
            self.round_results.push(RoundResult {
                round: self.round.max(1),
                target: self.target.clone(),
                selected: letters,
                correct: true,
                elapsed_ms,
            });
        }

        self.feedback = Feedback {
            active: true,
            selected_id: Some(id),
            correct: Some(correct),
        };
        self.events.push(SessionEvent::Selected { id, correct });

        if !correct {
            self.timers
                .schedule_once(now, FEEDBACK_DELAY_MS, TimerTask::ClearFeedback { epoch: self.epoch });
            return;
        }

        if playing {
            self.score += SCORE_PER_HIT;
            if self.round >= self.settings.total_rounds {
                self.finish();
                return;
            }
        }
        self.timers
            .schedule_once(now, FEEDBACK_DELAY_MS, TimerTask::AdvanceRound { epoch: self.epoch });
    }

    pub fn pause(&mut self) {
        if !self.phase.is_active() {
            return;
        }
        self.prior_phase = Some(self.phase);
        self.set_phase(GamePhase::Paused);
        self.clear_move_timer();
        log::info!("Game paused");
    }

    pub fn resume(&mut self) {
        if self.phase != GamePhase::Paused {
            return;
        }
        let now = self.clock.now_ms();
        let to = self.prior_phase.take().unwrap_or_else(|| {
            if self.settings.warmup_enabled && self.warmup_completed < self.settings.warmup_rounds_total {
                GamePhase::Warmup
            } else {
                GamePhase::Playing
            }
        });
        self.set_phase(to);
        self.start_move_timer(now);
        log::info!("Game resumed into {:?}", to);

        if std::mem::take(&mut self.advance_on_resume) {
            self.generate_round(now);
        }
    }

    /// End the run immediately and clear the board
    pub fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.advance_on_resume = false;
        self.set_phase(GamePhase::GameOver);
        self.clear_move_timer();
        self.target.clear();
        self.options.clear();
        self.grid = Grid::default();
        self.feedback = Feedback::default();
        log::info!("Game stopped (score {})", self.score);
    }

    /// Back to idle with all progress wiped; settings survive
    pub fn restart(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.set_phase(GamePhase::Idle);
        self.clear_move_timer();
        self.reset_progress();
        self.target.clear();
        self.options.clear();
        self.grid = Grid::default();
        log::info!("Game restarted");
    }

    /// Merge a partial settings update. Values are used as-is; problems show
    /// up (and get logged) where they're used.
    pub fn update_settings(&mut self, patch: &SettingsPatch) {
        self.settings.merge(patch);
        log::debug!("Settings updated: {:?}", self.settings);
    }

    /// Fire every timer that has come due. Returns how many fired.
    pub fn advance(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while fired < MAX_TIMER_FIRES {
            let Some((_, task)) = self.timers.pop_due(now) else {
                break;
            };
            self.run_task(task, now);
            fired += 1;
        }
        fired
    }

    /// Take all notifications emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // === Projections ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn warmup_rounds_left(&self) -> u32 {
        if !self.settings.warmup_enabled {
            return 0;
        }
        self.settings.warmup_rounds_total.saturating_sub(self.warmup_completed)
    }

    pub fn display_score(&self) -> u64 {
        self.score
    }

    pub fn display_round(&self) -> u32 {
        self.round
    }

    pub fn warmup_completed(&self) -> u32 {
        self.warmup_completed
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> &[GameOption] {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn click_history(&self) -> &[ClickRecord] {
        &self.click_history
    }

    pub fn round_results(&self) -> &[RoundResult] {
        &self.round_results
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed
    }

    pub fn move_timer_active(&self) -> bool {
        self.move_timer.is_some_and(|id| self.timers.is_pending(id))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_history(self.score, &self.click_history, &self.round_results)
    }

    /// Snapshot for rendering
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            is_paused: self.is_paused(),
            is_game_over: self.is_game_over(),
            target: self.target.clone(),
            options: self.options.clone(),
            score: self.score,
            round: self.round,
            warmup_rounds_left: self.warmup_rounds_left(),
            feedback: self.feedback,
            click_history: self.click_history.clone(),
            round_results: self.round_results.clone(),
            settings: self.settings.clone(),
        }
    }

    // === Internals ===

    fn set_phase(&mut self, to: GamePhase) {
        if self.phase != to {
            self.events.push(SessionEvent::PhaseChanged { from: self.phase, to });
            self.phase = to;
        }
    }

    fn reset_progress(&mut self) {
        self.score = 0;
        self.round = 0;
        self.warmup_completed = 0;
        self.click_history.clear();
        self.round_results.clear();
        self.feedback = Feedback::default();
        self.prior_phase = None;
        self.advance_on_resume = false;
    }

    fn clear_feedback(&mut self) {
        if self.feedback.active {
            self.feedback = Feedback::default();
            self.events.push(SessionEvent::FeedbackCleared);
        }
    }

    /// Scored run complete
    fn finish(&mut self) {
        self.set_phase(GamePhase::GameOver);
        self.clear_move_timer();
        self.events.push(SessionEvent::GameOver { score: self.score });
        log::info!("Game over: score {} after {} rounds", self.score, self.round);
    }

    fn generate_round(&mut self, now: f64) {
        let label = match self.phase {
            GamePhase::Warmup => {
                if self.warmup_completed >= self.settings.warmup_rounds_total {
                    log::info!("Warmup complete after {} rounds", self.warmup_completed);
                    self.set_phase(GamePhase::Playing);
                    self.round = 0;
                    return self.generate_round(now);
                }
                self.warmup_completed += 1;
                RoundLabel::Warmup(self.warmup_completed)
            }
            GamePhase::Playing => {
                self.round += 1;
                RoundLabel::Round(self.round)
            }
            GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver => return,
        };

        self.clear_feedback();

        let next_id = &mut self.next_option_id;
        let generated = round::generate(&mut self.rng.rng, &self.settings, || {
            *next_id = next_id.wrapping_add(1);
            *next_id
        });
        self.target = generated.target;
        self.options = generated.options;
        self.grid = generated.grid;
        self.round_started_ms = now;

        log::debug!("Round {} started, target {}", label, self.target);
        self.events.push(SessionEvent::RoundStarted {
            label,
            target: self.target.clone(),
        });
    }

    fn start_move_timer(&mut self, now: f64) {
        self.clear_move_timer();
        match self.settings.move_interval_ms() {
            Ok(interval) => {
                self.move_timer = Some(self.timers.schedule_repeating(now, interval, TimerTask::MoveOption));
            }
            Err(e) => log::error!("Move timer not started: {e}"),
        }
    }

    fn clear_move_timer(&mut self) {
        if let Some(id) = self.move_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn run_task(&mut self, task: TimerTask, now: f64) {
        match task {
            TimerTask::MoveOption => {
                if !self.phase.is_active() {
                    return;
                }
                if let Some(moved) = self.grid.relocate_one(&mut self.options, &mut self.rng.rng) {
                    self.events.push(SessionEvent::OptionMoved {
                        id: moved.id,
                        from: moved.from,
                        to: moved.to,
                    });
                }
            }
            TimerTask::AdvanceRound { epoch } => {
                if epoch != self.epoch {
                    return;
                }
                match self.phase {
                    GamePhase::Paused => self.advance_on_resume = true,
                    _ => self.generate_round(now),
                }
            }
            TimerTask::ClearFeedback { epoch } => {
                if epoch == self.epoch {
                    self.clear_feedback();
                }
            }
        }
    }
}
