//! Embassy async tasks
//!
//! Only edge counting is async; sampling runs as a blocking loop on the
//! thread executor.

pub mod pulse;

pub use pulse::pulse_task;
