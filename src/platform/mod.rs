//! Platform abstraction layer
//!
//! Handles browser/native differences for wall-clock time. The session never
//! reads the clock directly; it is handed one at construction.

use std::cell::Cell;
use std::rc::Rc;

/// Millisecond wall clock
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real time: `Date.now()` in the browser, `SystemTime` natively
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for tests and the headless demo.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1000.0);
        let handle = clock.clone();
        handle.advance(250.0);
        assert_eq!(clock.now_ms(), 1250.0);
        handle.set(10.0);
        assert_eq!(clock.now_ms(), 10.0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a > 0.0);
        assert!(b >= a);
    }
}
