//! Temperature reading with disconnected-sensor handling
//!
//! Every read requests a fresh conversion. Nothing is cached: a failed read
//! yields [`TemperatureReading::Disconnected`], never the previous value.

use crate::traits::TemperatureProbe;

/// Value 1-wire temperature libraries report for a missing device
pub const DEVICE_DISCONNECTED_C: f32 = -127.0;

/// Outcome of one temperature sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureReading {
    /// Valid reading in degrees Celsius
    Celsius(f32),
    /// Sensor absent or not responding
    Disconnected,
}

impl TemperatureReading {
    /// Classify a raw value, mapping the wire-level sentinel to `Disconnected`
    pub fn from_celsius(celsius: f32) -> Self {
        if !celsius.is_finite() || celsius == DEVICE_DISCONNECTED_C {
            TemperatureReading::Disconnected
        } else {
            TemperatureReading::Celsius(celsius)
        }
    }

    /// The reading, if valid
    pub fn celsius(&self) -> Option<f32> {
        match self {
            TemperatureReading::Celsius(c) => Some(*c),
            TemperatureReading::Disconnected => None,
        }
    }

    /// Whether the sensor was absent
    pub fn is_disconnected(&self) -> bool {
        matches!(self, TemperatureReading::Disconnected)
    }
}

/// Reads one device on a temperature probe bus
#[derive(Debug)]
pub struct TemperatureReader<P> {
    probe: P,
    index: u8,
}

impl<P: TemperatureProbe> TemperatureReader<P> {
    /// Read the `index`-th device of `probe`
    pub fn new(probe: P, index: u8) -> Self {
        Self { probe, index }
    }

    /// Request a conversion, wait for it, and read the result
    ///
    /// Blocks for the probe's conversion latency. Any probe error is
    /// reported as `Disconnected`.
    pub fn read_celsius(&mut self) -> TemperatureReading {
        if self.probe.request_conversion().is_err() {
            return TemperatureReading::Disconnected;
        }

        match self.probe.read_last_celsius(self.index) {
            Ok(celsius) => TemperatureReading::from_celsius(celsius),
            Err(_) => TemperatureReading::Disconnected,
        }
    }

    /// Device index on the bus
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Access the underlying probe
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Release the underlying probe
    pub fn into_inner(self) -> P {
        self.probe
    }
}
