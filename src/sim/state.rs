//! Session data types
//!
//! Everything the UI needs to render lives in these types; `SessionView` is
//! the serializable snapshot handed across the wasm boundary.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Waiting for the player to start
    #[default]
    Idle,
    /// Unscored practice rounds
    Warmup,
    /// Scored rounds
    Playing,
    /// Paused from warmup or playing
    Paused,
    /// Run ended
    GameOver,
}

impl GamePhase {
    /// Phases in which rounds run, options move and picks count
    pub fn is_active(self) -> bool {
        matches!(self, GamePhase::Warmup | GamePhase::Playing)
    }
}

/// A grid cell (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A selectable letter pair on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOption {
    pub id: u32,
    pub letters: String,
    pub is_correct: bool,
    /// `None` only when the grid ran out of cells during placement
    pub cell: Option<Cell>,
}

/// Label a click is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundLabel {
    /// Warmup round n (1-based)
    Warmup(u32),
    /// Scored round n (1-based)
    Round(u32),
}

impl std::fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundLabel::Warmup(n) => write!(f, "W{n}"),
            RoundLabel::Round(n) => write!(f, "{n}"),
        }
    }
}

/// One selection attempt, right or wrong, warmup or scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub round: RoundLabel,
    pub letters: String,
    pub correct: bool,
    pub elapsed_ms: u64,
}

/// A scored round the player completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub target: String,
    pub selected: String,
    pub correct: bool,
    pub elapsed_ms: u64,
}

/// Selection feedback shown during the feedback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feedback {
    pub active: bool,
    pub selected_id: Option<u32>,
    pub correct: Option<bool>,
}

/// Notifications emitted after state changes, drained by the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    RoundStarted { label: RoundLabel, target: String },
    OptionMoved { id: u32, from: Option<Cell>, to: Cell },
    Selected { id: u32, correct: bool },
    FeedbackCleared,
    GameOver { score: u64 },
}

/// RNG state wrapper so a seed reproduces a whole run
#[derive(Debug, Clone)]
pub struct RngState {
    pub seed: u64,
    pub rng: Pcg32,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

/// Aggregate numbers over the scored rounds of a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub rounds_completed: u32,
    /// Scored-phase picks that were correct
    pub hits: u32,
    /// Scored-phase picks that were wrong
    pub misses: u32,
    /// Percent of scored-phase picks that were correct (100 with no picks)
    pub accuracy: f64,
    pub mean_reaction_ms: Option<f64>,
    pub best_reaction_ms: Option<u64>,
}

impl SessionSummary {
    pub fn from_history(score: u64, clicks: &[ClickRecord], results: &[RoundResult]) -> Self {
        let (hits, misses) = clicks
            .iter()
            .filter(|c| matches!(c.round, RoundLabel::Round(_)))
            .fold((0u32, 0u32), |(h, m), c| if c.correct { (h + 1, m) } else { (h, m + 1) });
        let attempts = hits + misses;
        let accuracy = if attempts == 0 {
            100.0
        } else {
            hits as f64 / attempts as f64 * 100.0
        };
        let mean_reaction_ms = if results.is_empty() {
            None
        } else {
            let total: u64 = results.iter().map(|r| r.elapsed_ms).sum();
            Some(total as f64 / results.len() as f64)
        };

        Self {
            score,
            rounds_completed: results.len() as u32,
            hits,
            misses,
            accuracy,
            mean_reaction_ms,
            best_reaction_ms: results.iter().map(|r| r.elapsed_ms).min(),
        }
    }
}

/// Read-only snapshot of the session for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: GamePhase,
    pub is_paused: bool,
    pub is_game_over: bool,
    pub target: String,
    pub options: Vec<GameOption>,
    pub score: u64,
    pub round: u32,
    pub warmup_rounds_left: u32,
    pub feedback: Feedback,
    pub click_history: Vec<ClickRecord>,
    pub round_results: Vec<RoundResult>,
    pub settings: Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(round: RoundLabel, correct: bool) -> ClickRecord {
        ClickRecord {
            round,
            letters: "AB".to_string(),
            correct,
            elapsed_ms: 0,
        }
    }

    fn result(round: u32, elapsed_ms: u64) -> RoundResult {
        RoundResult {
            round,
            target: "AB".to_string(),
            selected: "AB".to_string(),
            correct: true,
            elapsed_ms,
        }
    }

    #[test]
    fn test_round_label_display() {
        assert_eq!(RoundLabel::Warmup(2).to_string(), "W2");
        assert_eq!(RoundLabel::Round(7).to_string(), "7");
    }

    #[test]
    fn test_summary_ignores_warmup_clicks() {
        let clicks = vec![
            click(RoundLabel::Warmup(1), false),
            click(RoundLabel::Warmup(1), true),
            click(RoundLabel::Round(1), false),
            click(RoundLabel::Round(1), true),
            click(RoundLabel::Round(2), true),
        ];
        let results = vec![result(1, 900), result(2, 600)];
        let summary = SessionSummary::from_history(20, &clicks, &results);

        assert_eq!(summary.hits, 2);
        assert_eq!(summary.misses, 1);
        assert!((summary.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.mean_reaction_ms, Some(750.0));
        assert_eq!(summary.best_reaction_ms, Some(600));
        assert_eq!(summary.rounds_completed, 2);
    }

    #[test]
    fn test_summary_empty() {
        let summary = SessionSummary::from_history(0, &[], &[]);
        assert_eq!(summary.accuracy, 100.0);
        assert_eq!(summary.mean_reaction_ms, None);
        assert_eq!(summary.best_reaction_ms, None);
    }

    #[test]
    fn test_phase_active() {
        assert!(GamePhase::Warmup.is_active());
        assert!(GamePhase::Playing.is_active());
        assert!(!GamePhase::Paused.is_active());
        assert!(!GamePhase::Idle.is_active());
        assert!(!GamePhase::GameOver.is_active());
    }
}
