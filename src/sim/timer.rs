//! Virtual-time timer queue
//!
//! The session schedules its deferred work here instead of on a host timer.
//! The host pumps the queue (see `GameSession::advance`) from whatever
//! scheduler it has: `setInterval` in the browser, a plain loop natively.
//! Timers fire in due-time order; ties fire in scheduling order.

use serde::{Deserialize, Serialize};

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Work a timer performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Relocate one option (repeating)
    MoveOption,
    /// Feedback window over after a correct pick: next round
    AdvanceRound { epoch: u32 },
    /// Feedback window over after a wrong pick
    ClearFeedback { epoch: u32 },
}

#[derive(Debug, Clone)]
struct Entry {
    id: TimerId,
    due_ms: f64,
    interval_ms: Option<f64>,
    task: TimerTask,
}

/// Pending one-shot and repeating timers
#[derive(Debug, Clone, Default)]
pub struct Timers {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: f64, interval_ms: Option<f64>, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms,
            interval_ms,
            task,
        });
        id
    }

    /// Fire `task` once at `now_ms + delay_ms`
    pub fn schedule_once(&mut self, now_ms: f64, delay_ms: f64, task: TimerTask) -> TimerId {
        self.push(now_ms + delay_ms.max(0.0), None, task)
    }

    /// Fire `task` every `interval_ms`, first at `now_ms + interval_ms`.
    /// Callers must pass a positive interval.
    pub fn schedule_repeating(&mut self, now_ms: f64, interval_ms: f64, task: TimerTask) -> TimerId {
        debug_assert!(interval_ms > 0.0);
        self.push(now_ms + interval_ms, Some(interval_ms), task)
    }

    /// Cancel a timer; returns whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest timer due at or before `now_ms`.
    ///
    /// Repeating timers are re-armed one interval after their due time and
    /// keep their id. Returns the due time along with the task so callers can
    /// act "as of" when the timer should have fired.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(f64, TimerTask)> {
        let (index, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by(|(ia, a), (ib, b)| a.due_ms.total_cmp(&b.due_ms).then(ia.cmp(ib)))?;

        let entry = &self.entries[index];
        let due_ms = entry.due_ms;
        let task = entry.task;
        match entry.interval_ms {
            Some(interval) => {
                // Re-queue at the back so ties keep firing in schedule order
                let mut rearmed = self.entries.remove(index);
                rearmed.due_ms = due_ms + interval;
                self.entries.push(rearmed);
            }
            None => {
                self.entries.remove(index);
            }
        }
        Some((due_ms, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut timers = Timers::new();
        timers.schedule_once(0.0, 500.0, TimerTask::ClearFeedback { epoch: 0 });

        assert_eq!(timers.pop_due(499.0), None);
        assert_eq!(
            timers.pop_due(500.0),
            Some((500.0, TimerTask::ClearFeedback { epoch: 0 }))
        );
        assert_eq!(timers.pop_due(10_000.0), None);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_repeating_catches_up_in_order() {
        let mut timers = Timers::new();
        let id = timers.schedule_repeating(0.0, 100.0, TimerTask::MoveOption);

        let mut fired = Vec::new();
        while let Some((at, _)) = timers.pop_due(350.0) {
            fired.push(at);
        }
        assert_eq!(fired, vec![100.0, 200.0, 300.0]);
        assert!(timers.is_pending(id));
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        let id = timers.schedule_repeating(0.0, 100.0, TimerTask::MoveOption);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pop_due(1_000.0), None);
    }

    #[test]
    fn test_earliest_first_then_schedule_order() {
        let mut timers = Timers::new();
        timers.schedule_once(0.0, 300.0, TimerTask::AdvanceRound { epoch: 1 });
        timers.schedule_once(0.0, 100.0, TimerTask::ClearFeedback { epoch: 1 });
        timers.schedule_once(0.0, 100.0, TimerTask::ClearFeedback { epoch: 2 });

        assert_eq!(timers.pop_due(1_000.0).map(|(_, t)| t), Some(TimerTask::ClearFeedback { epoch: 1 }));
        assert_eq!(timers.pop_due(1_000.0).map(|(_, t)| t), Some(TimerTask::ClearFeedback { epoch: 2 }));
        assert_eq!(timers.pop_due(1_000.0).map(|(_, t)| t), Some(TimerTask::AdvanceRound { epoch: 1 }));
    }
}
