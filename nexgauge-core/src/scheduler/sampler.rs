//! Cooperative sampler
//!
//! Runs the configured tasks against one clock reading per iteration.
//! A due task runs sample, convert, format and transmit to completion
//! before the next task is looked at. The temperature conversion wait is
//! the only blocking step; pulse counting continues at interrupt priority
//! while it runs.
//!
//! Pulse rates use the measured window since the last firing. A loop that
//! polls exactly on each interval boundary measures the configured
//! interval, giving the same result as converting over the nominal window.

use heapless::Vec;
use nexgauge_hal::{MonotonicClock, UartTx};
use nexgauge_protocol::FieldId;

use super::stop::StopSignal;
use super::window::SampleWindow;
use super::TaskKind;
use crate::config::{BannerConfig, ConfigError, GaugeConfig};
use crate::convert::{rpm_from, speed_kmh};
use crate::display::{DisplayLink, LinkError};
use crate::pulse::PulseCounter;
use crate::temperature::{TemperatureReader, TemperatureReading};
use crate::traits::TemperatureProbe;

/// Hardware resources the scheduler samples from
pub struct SampleContext<'a, P, T> {
    /// Edge counter of the rotation sensor
    pub rpm_counter: Option<&'a PulseCounter>,
    /// Edge counter of the wheel sensor
    pub speed_counter: Option<&'a PulseCounter>,
    /// Temperature probe
    pub probe: Option<P>,
    /// Display transmitter
    pub display: T,
}

/// Value produced by one task firing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sample {
    /// Drained pulses and the derived shaft speed
    Rpm { pulses: u32, rpm: f32 },
    /// Probe reading
    Temperature(TemperatureReading),
    /// Drained pulses and the derived road speed
    Speed { pulses: u32, kmh: f32 },
}

/// One task that ran during a poll
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FiredTask {
    /// Which task
    pub kind: TaskKind,
    /// What it measured
    pub sample: Sample,
    /// Measured window length
    pub elapsed_ms: u32,
    /// Outcome of the display write
    pub link: Result<(), LinkError>,
}

/// Tasks fired by one [`SampleScheduler::poll`], in execution order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Fired tasks
    pub fired: Vec<FiredTask, 3>,
}

impl PollReport {
    /// Whether nothing was due
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// The firing of `kind`, if it ran
    pub fn get(&self, kind: TaskKind) -> Option<&FiredTask> {
        self.fired.iter().find(|f| f.kind == kind)
    }

    /// Iterate fired tasks
    pub fn iter(&self) -> impl Iterator<Item = &FiredTask> {
        self.fired.iter()
    }
}

struct RpmTask<'a> {
    counter: &'a PulseCounter,
    field: FieldId,
    pulses_per_revolution: u16,
    decimals: u8,
    window: SampleWindow,
}

struct TemperatureTask<P> {
    reader: TemperatureReader<P>,
    field: FieldId,
    decimals: u8,
    window: SampleWindow,
}

struct SpeedTask<'a> {
    counter: &'a PulseCounter,
    field: FieldId,
    pulses_per_revolution: u16,
    wheel_circumference_m: f32,
    decimals: u8,
    window: SampleWindow,
}

/// Periodic sampler driving the display
pub struct SampleScheduler<'a, P, T> {
    display: DisplayLink<T>,
    banner: Option<BannerConfig>,
    rpm: Option<RpmTask<'a>>,
    temperature: Option<TemperatureTask<P>>,
    speed: Option<SpeedTask<'a>>,
}

impl<'a, P: TemperatureProbe, T: UartTx> SampleScheduler<'a, P, T> {
    /// Build a scheduler whose windows all start at `now_ms`
    ///
    /// The configuration is validated first. Every configured task must
    /// have its resource in `ctx`; resources of unconfigured tasks are
    /// dropped. Counters are drained so the first window only counts edges
    /// seen after construction.
    pub fn new(
        config: &GaugeConfig,
        ctx: SampleContext<'a, P, T>,
        now_ms: u32,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rpm = match &config.rpm {
            Some(cfg) => {
                let counter = ctx
                    .rpm_counter
                    .ok_or(ConfigError::MissingSensor(TaskKind::Rpm))?;
                counter.drain();
                Some(RpmTask {
                    counter,
                    field: cfg.field.clone(),
                    pulses_per_revolution: cfg.pulses_per_revolution,
                    decimals: cfg.decimals,
                    window: SampleWindow::new(cfg.interval_ms, now_ms),
                })
            }
            None => None,
        };

        let temperature = match &config.temperature {
            Some(cfg) => {
                let probe = ctx
                    .probe
                    .ok_or(ConfigError::MissingSensor(TaskKind::Temperature))?;
                Some(TemperatureTask {
                    reader: TemperatureReader::new(probe, cfg.sensor_index),
                    field: cfg.field.clone(),
                    decimals: cfg.decimals,
                    window: SampleWindow::new(cfg.interval_ms, now_ms),
                })
            }
            None => None,
        };

        let speed = match &config.speed {
            Some(cfg) => {
                let counter = ctx
                    .speed_counter
                    .ok_or(ConfigError::MissingSensor(TaskKind::Speed))?;
                counter.drain();
                Some(SpeedTask {
                    counter,
                    field: cfg.field.clone(),
                    pulses_per_revolution: cfg.pulses_per_revolution,
                    wheel_circumference_m: cfg.wheel_circumference_m,
                    decimals: cfg.decimals,
                    window: SampleWindow::new(cfg.interval_ms, now_ms),
                })
            }
            None => None,
        };

        Ok(Self {
            display: DisplayLink::new(ctx.display),
            banner: config.display.banner.clone(),
            rpm,
            temperature,
            speed,
        })
    }

    /// Write the start-up banner, if configured
    pub fn start(&mut self) -> Result<(), LinkError> {
        match &self.banner {
            Some(banner) => self.display.show_text(&banner.field, &banner.text),
            None => Ok(()),
        }
    }

    /// Run one iteration at `now_ms`
    pub fn poll(&mut self, now_ms: u32) -> PollReport {
        let mut report = PollReport::default();
        for kind in TaskKind::ORDER {
            if let Some(fired) = self.fire(kind, now_ms) {
                // At most one firing per task kind
                let _ = report.fired.push(fired);
            }
        }
        report
    }

    /// Poll until `stop` is set, handing every non-empty report to `on_report`
    ///
    /// `stop` is checked once per iteration, before the clock is read.
    pub fn run<C: MonotonicClock>(
        &mut self,
        clock: &C,
        stop: &StopSignal,
        mut on_report: impl FnMut(&PollReport),
    ) {
        while !stop.is_stopped() {
            let report = self.poll(clock.now_ms());
            if !report.is_empty() {
                on_report(&report);
            }
        }
    }

    fn fire(&mut self, kind: TaskKind, now_ms: u32) -> Option<FiredTask> {
        match kind {
            TaskKind::Rpm => {
                let task = self.rpm.as_mut()?;
                if !task.window.begin(now_ms) {
                    return None;
                }
                let elapsed_ms = task.window.elapsed(now_ms);
                let pulses = task.counter.drain();
                let rpm = rpm_from(pulses, elapsed_ms, task.pulses_per_revolution);
                let link = self.display.show_number(&task.field, rpm, task.decimals);
                task.window.complete(now_ms);
                Some(FiredTask {
                    kind,
                    sample: Sample::Rpm { pulses, rpm },
                    elapsed_ms,
                    link,
                })
            }
            TaskKind::Temperature => {
                let task = self.temperature.as_mut()?;
                if !task.window.begin(now_ms) {
                    return None;
                }
                let elapsed_ms = task.window.elapsed(now_ms);
                let reading = task.reader.read_celsius();
                let link = self
                    .display
                    .show_temperature(&task.field, reading, task.decimals);
                task.window.complete(now_ms);
                Some(FiredTask {
                    kind,
                    sample: Sample::Temperature(reading),
                    elapsed_ms,
                    link,
                })
            }
            TaskKind::Speed => {
                let task = self.speed.as_mut()?;
                if !task.window.begin(now_ms) {
                    return None;
                }
                let elapsed_ms = task.window.elapsed(now_ms);
                let pulses = task.counter.drain();
                let kmh = speed_kmh(
                    pulses,
                    elapsed_ms,
                    task.wheel_circumference_m,
                    task.pulses_per_revolution,
                );
                let link = self.display.show_number(&task.field, kmh, task.decimals);
                task.window.complete(now_ms);
                Some(FiredTask {
                    kind,
                    sample: Sample::Speed { pulses, kmh },
                    elapsed_ms,
                    link,
                })
            }
        }
    }

    /// Sampling window of a configured task
    pub fn window(&self, kind: TaskKind) -> Option<&SampleWindow> {
        match kind {
            TaskKind::Rpm => self.rpm.as_ref().map(|t| &t.window),
            TaskKind::Temperature => self.temperature.as_ref().map(|t| &t.window),
            TaskKind::Speed => self.speed.as_ref().map(|t| &t.window),
        }
    }

    /// Display link
    pub fn display(&self) -> &DisplayLink<T> {
        &self.display
    }

    /// Release the display link and the probe
    pub fn into_parts(self) -> (DisplayLink<T>, Option<P>) {
        let probe = self.temperature.map(|t| t.reader.into_inner());
        (self.display, probe)
    }
}
