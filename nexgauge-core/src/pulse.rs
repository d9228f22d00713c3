//! Interrupt-safe pulse counter
//!
//! One counter per monitored line. The edge handler increments it; the
//! sampler drains it. Both operations are single atomic instructions (or a
//! short critical section on targets without atomic read-modify-write), so
//! an edge racing a drain lands in exactly one drain.

use portable_atomic::{AtomicU32, Ordering};

/// Highest edge rate counted without loss
///
/// The edge handler re-arms after each edge, and the 1-wire bus masks
/// interrupts for up to 70 µs per time slot. Two edges closer than 100 µs
/// can therefore be counted as one. Signals faster than this need a
/// hardware counter.
pub const MAX_EDGE_RATE_HZ: u32 = 10_000;

/// Accumulate-then-drain edge counter
///
/// Designed to live in a `static` shared between an interrupt handler and
/// the main loop.
#[derive(Debug)]
pub struct PulseCounter {
    count: AtomicU32,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseCounter {
    /// Create a counter at zero
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Count one edge
    ///
    /// Call only from the edge handler. Wraps on overflow.
    #[inline]
    pub fn register_edge(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the number of edges since the previous drain and reset to zero
    #[inline]
    pub fn drain(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Current count without resetting
    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}
