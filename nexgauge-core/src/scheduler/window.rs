//! Per-task sampling window
//!
//! Intervals are measured from the task's own last firing, not from a fixed
//! grid: a late iteration fires once and the next deadline moves with it.
//! Missed intervals are never backfilled.

use nexgauge_hal::clock::elapsed_ms;

/// Task lifecycle within one scheduler iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Waiting for the interval to elapse
    Idle,
    /// Interval elapsed; sampling sequence in progress
    Due,
}

/// Interval and last-fired timestamp of one periodic task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleWindow {
    interval_ms: u32,
    last_fired_ms: u32,
    state: TaskState,
}

impl SampleWindow {
    /// Window whose first deadline is one interval after `start_ms`
    pub const fn new(interval_ms: u32, start_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fired_ms: start_ms,
            state: TaskState::Idle,
        }
    }

    /// Whether a full interval has elapsed at `now_ms`
    pub fn is_due(&self, now_ms: u32) -> bool {
        elapsed_ms(now_ms, self.last_fired_ms) >= self.interval_ms
    }

    /// Move to `Due` if the interval has elapsed
    ///
    /// Returns `true` when the task should run now. The task stays `Due`
    /// until [`complete`](Self::complete) is called.
    pub fn begin(&mut self, now_ms: u32) -> bool {
        if self.state == TaskState::Idle && self.is_due(now_ms) {
            self.state = TaskState::Due;
        }
        self.state == TaskState::Due
    }

    /// Record a finished run at the iteration timestamp and return to `Idle`
    pub fn complete(&mut self, now_ms: u32) {
        self.last_fired_ms = now_ms;
        self.state = TaskState::Idle;
    }

    /// Milliseconds since the last firing
    pub fn elapsed(&self, now_ms: u32) -> u32 {
        elapsed_ms(now_ms, self.last_fired_ms)
    }

    /// Configured interval
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Timestamp of the last completed firing
    pub fn last_fired_ms(&self) -> u32 {
        self.last_fired_ms
    }

    /// Current state
    pub fn state(&self) -> TaskState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_due_before_interval() {
        let mut w = SampleWindow::new(1000, 0);
        assert!(!w.begin(999));
        assert_eq!(w.state(), TaskState::Idle);
    }

    #[test]
    fn test_due_at_interval() {
        let mut w = SampleWindow::new(1000, 0);
        assert!(w.begin(1000));
        assert_eq!(w.state(), TaskState::Due);
    }

    #[test]
    fn test_stays_due_until_complete() {
        let mut w = SampleWindow::new(1000, 0);
        assert!(w.begin(1000));
        // last_fired only moves on completion
        assert_eq!(w.last_fired_ms(), 0);
        assert!(w.begin(1000));

        w.complete(1000);
        assert_eq!(w.state(), TaskState::Idle);
        assert_eq!(w.last_fired_ms(), 1000);
        assert!(!w.begin(1500));
    }

    #[test]
    fn test_stall_fires_once() {
        let mut w = SampleWindow::new(1000, 0);
        // Loop stalled for three intervals
        assert!(w.begin(3000));
        w.complete(3000);
        assert!(!w.begin(3000));
        assert!(!w.begin(3999));
        assert!(w.begin(4000));
    }

    #[test]
    fn test_deadline_follows_late_firing() {
        let mut w = SampleWindow::new(1000, 0);
        assert!(w.begin(1250));
        w.complete(1250);
        // Next deadline is 2250, not 2000
        assert!(!w.begin(2000));
        assert!(w.begin(2250));
    }

    #[test]
    fn test_wraparound() {
        let start = u32::MAX - 500;
        let mut w = SampleWindow::new(1000, start);
        assert!(!w.begin(u32::MAX));
        assert!(!w.begin(498));
        assert!(w.begin(499));
        assert_eq!(w.elapsed(499), 1000);
    }
}
