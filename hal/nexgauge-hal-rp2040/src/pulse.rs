//! Edge-counting pulse inputs
//!
//! Each input waits on its GPIO edge interrupt and bumps a shared
//! [`PulseCounter`]. Run these on an interrupt-priority executor so they
//! preempt the blocking sampler loop.

use embassy_rp::gpio::{AnyPin, Input, Pull as RpPull};
use embassy_rp::Peri;
use nexgauge_core::config::PinConfig;
use nexgauge_core::pulse::PulseCounter;
use nexgauge_hal::{Edge, Pull};

/// Map the shared bias setting to embassy-rp's
pub fn to_rp_pull(pull: Pull) -> RpPull {
    match pull {
        Pull::None => RpPull::None,
        Pull::Up => RpPull::Up,
        Pull::Down => RpPull::Down,
    }
}

/// Sensor input counting one edge direction
pub struct PulseInput {
    input: Input<'static>,
    edge: Edge,
}

impl PulseInput {
    /// Configure `pin` from its config entry
    ///
    /// `^` enables the pull-up; `!` counts falling edges.
    pub fn new(pin: Peri<'static, AnyPin>, config: &PinConfig) -> Self {
        let pull = to_rp_pull(Pull::from_pull_up(config.pull_up));
        Self {
            input: Input::new(pin, pull),
            edge: Edge::from_inverted(config.inverted),
        }
    }

    /// Wait for the next counted edge
    pub async fn wait_for_edge(&mut self) {
        match self.edge {
            Edge::Rising => self.input.wait_for_rising_edge().await,
            Edge::Falling => self.input.wait_for_falling_edge().await,
        }
    }

    /// Count edges into `counter` forever
    ///
    /// Edges are seen one wakeup at a time, so the input is reliable up to
    /// [`MAX_EDGE_RATE_HZ`](nexgauge_core::pulse::MAX_EDGE_RATE_HZ). Above
    /// that, edges arriving before the next wait is armed are merged.
    pub async fn count_into(&mut self, counter: &PulseCounter) -> ! {
        loop {
            self.wait_for_edge().await;
            counter.register_edge();
        }
    }
}
