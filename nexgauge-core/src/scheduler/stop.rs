//! Stop contract for the sampling loop

use portable_atomic::{AtomicBool, Ordering};

/// Request for [`SampleScheduler::run`](super::SampleScheduler::run) to return
///
/// Checked once per loop iteration, so a running task always completes.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
}

impl StopSignal {
    /// A signal that has not been raised
    pub const fn new() -> Self {
        Self {
            stopped: AtomicBool::new(false),
        }
    }

    /// Ask the loop to return after the current iteration
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Clear a previous request so the loop can run again
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::Release);
    }
}
