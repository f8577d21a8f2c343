//! Glyph Hunt - a visual-search letter-pair training game
//!
//! Core modules:
//! - `sim`: Session state machine, round generation, grid placement and timers
//! - `platform`: Browser/native clock abstraction
//! - `settings`: Player-tunable game settings (persisted to LocalStorage)
//! - `highscores`: Leaderboard of finished runs

pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{ConfigError, Settings, SettingsPatch};

/// Game configuration constants
pub mod consts {
    /// Letters per target/distractor
    pub const TARGET_LEN: usize = 2;
    /// Alphabet the letter pairs are drawn from
    pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    /// Number of distinct letter pairs
    pub const PAIR_SPACE: usize = ALPHABET.len() * ALPHABET.len();

    /// Points awarded for a correct pick in a scored round
    pub const SCORE_PER_HIT: u64 = 10;
    /// How long selection feedback stays on screen before the round moves on (ms)
    pub const FEEDBACK_DELAY_MS: f64 = 500.0;
}
