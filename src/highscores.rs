//! High score leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 finished runs.

use serde::{Deserialize, Serialize};

use crate::sim::SessionSummary;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Scored rounds completed
    pub rounds: u32,
    /// Mean time to find the target (ms)
    #[serde(default)]
    pub mean_reaction_ms: Option<f64>,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

impl HighScoreEntry {
    /// Higher score wins; on a tie the quicker mean reaction wins
    fn beats(&self, other: &HighScoreEntry) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        match (self.mean_reaction_ms, other.mean_reaction_ms) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

/// High score leaderboard, best first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "glyph_hunt_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn entry(summary: &SessionSummary, timestamp: f64) -> HighScoreEntry {
        HighScoreEntry {
            score: summary.score,
            rounds: summary.rounds_completed,
            mean_reaction_ms: summary.mean_reaction_ms,
            timestamp,
        }
    }

    fn position(&self, entry: &HighScoreEntry) -> Option<usize> {
        if entry.score == 0 {
            return None;
        }
        let pos = self
            .entries
            .iter()
            .position(|e| entry.beats(e))
            .unwrap_or(self.entries.len());
        (pos < MAX_HIGH_SCORES).then_some(pos)
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, summary: &SessionSummary) -> bool {
        self.potential_rank(summary).is_some()
    }

    /// Get the rank a run would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, summary: &SessionSummary) -> Option<usize> {
        self.position(&Self::entry(summary, 0.0)).map(|p| p + 1)
    }

    /// Add a finished run (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_run(&mut self, summary: &SessionSummary, timestamp: f64) -> Option<usize> {
        let entry = Self::entry(summary, timestamp);
        let pos = self.position(&entry)?;
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(pos + 1)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
                log::warn!("Stored high scores unreadable, starting fresh");
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u64, mean: Option<f64>) -> SessionSummary {
        SessionSummary {
            score,
            rounds_completed: (score / 10) as u32,
            mean_reaction_ms: mean,
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_score_never_qualifies() {
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(&run(0, None)));
        assert_eq!(scores.add_run(&run(0, None), 1.0), None);
        assert!(scores.is_empty());
    }

    #[test]
    fn test_sorted_best_first() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_run(&run(30, Some(900.0)), 1.0), Some(1));
        assert_eq!(scores.add_run(&run(50, Some(900.0)), 2.0), Some(1));
        assert_eq!(scores.add_run(&run(40, Some(900.0)), 3.0), Some(2));
        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![50, 40, 30]);
        assert_eq!(scores.top_score(), Some(50));
    }

    #[test]
    fn test_tie_broken_by_reaction_time() {
        let mut scores = HighScores::new();
        scores.add_run(&run(40, Some(800.0)), 1.0);
        assert_eq!(scores.potential_rank(&run(40, Some(600.0))), Some(1));
        assert_eq!(scores.potential_rank(&run(40, Some(900.0))), Some(2));
    }

    #[test]
    fn test_truncates_to_max() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_run(&run(i * 10, None), i as f64);
        }
        assert!(!scores.qualifies(&run(5, None)));
        assert_eq!(scores.add_run(&run(1000, None), 99.0), Some(1));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(20));
    }
}
