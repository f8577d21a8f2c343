//! Game session module
//!
//! All gameplay logic lives here. This module must stay host-agnostic:
//! - Time comes from an injected `Clock`
//! - Seeded RNG only
//! - Deferred work runs off the session's own timer queue
//! - No rendering or DOM dependencies

pub mod grid;
pub mod round;
pub mod session;
pub mod state;
pub mod timer;

pub use grid::{Grid, Relocation};
pub use round::{Round, distractors, random_pair};
pub use session::{GameSession, MAX_TIMER_FIRES};
pub use state::{
    Cell, ClickRecord, Feedback, GameOption, GamePhase, RoundLabel, RoundResult, SessionEvent,
    SessionSummary, SessionView,
};
pub use timer::{TimerId, TimerTask, Timers};
