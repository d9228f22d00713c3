//! Monotonic time source
//!
//! The sampler only needs a free-running millisecond counter. The counter is
//! 32 bits wide and wraps after ~49.7 days; consumers must compare timestamps
//! with [`elapsed_ms`] (wrapping subtraction), never with `<`/`>`.

/// Free-running millisecond clock
///
/// Implementations must never go backwards and must not be resettable.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed origin (typically boot)
    fn now_ms(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Milliseconds elapsed from `earlier` to `now`, correct across wraparound
#[inline]
pub const fn elapsed_ms(now: u32, earlier: u32) -> u32 {
    now.wrapping_sub(earlier)
}
