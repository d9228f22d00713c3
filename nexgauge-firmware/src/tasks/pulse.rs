//! Pulse counting task
//!
//! One instance per pulse sensor. Spawned on the interrupt executor so an
//! edge is counted even while the sampler is busy on the 1-wire bus.

use defmt::*;

use nexgauge_core::pulse::PulseCounter;
use nexgauge_hal_rp2040::PulseInput;

/// Count edges on `input` into `counter`
///
/// Pool holds the RPM and speed inputs.
#[embassy_executor::task(pool_size = 2)]
pub async fn pulse_task(mut input: PulseInput, counter: &'static PulseCounter, name: &'static str) {
    info!("Pulse task started: {}", name);
    input.count_into(counter).await
}
