//! Cooperative sample scheduling
//!
//! Each periodic task owns a [`SampleWindow`]. The [`SampleScheduler`]
//! reads the clock once per iteration and runs every due task to completion,
//! in declaration order, before looking at the clock again.

pub mod sampler;
pub mod stop;
pub mod window;

pub use sampler::{FiredTask, PollReport, Sample, SampleContext, SampleScheduler};
pub use stop::StopSignal;
pub use window::{SampleWindow, TaskState};

/// Periodic tasks, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskKind {
    /// Shaft speed from the rotation sensor
    Rpm,
    /// 1-wire temperature probe
    Temperature,
    /// Vehicle speed from the wheel sensor
    Speed,
}

impl TaskKind {
    /// All tasks in the order they run when due on the same tick
    pub const ORDER: [TaskKind; 3] = [TaskKind::Rpm, TaskKind::Temperature, TaskKind::Speed];

    /// Config section name
    pub const fn name(self) -> &'static str {
        match self {
            TaskKind::Rpm => "rpm",
            TaskKind::Temperature => "temperature",
            TaskKind::Speed => "speed",
        }
    }
}
