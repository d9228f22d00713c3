//! Monotonic clock backed by the embassy time driver

use embassy_time::Instant;
use nexgauge_hal::MonotonicClock;

/// Milliseconds since boot, wrapping every ~49.7 days
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap
        Instant::now().as_millis() as u32
    }
}
