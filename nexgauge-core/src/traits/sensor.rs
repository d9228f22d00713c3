//! Temperature probe trait

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No device answered the bus reset
    NoDevice,
    /// No device at the requested index
    NotFound,
    /// Data read back failed its CRC
    CrcMismatch,
    /// Bus stuck or otherwise unusable
    BusFault,
}

/// Trait for digital temperature probes
///
/// The conversion is split in two so that drivers can block for the
/// device's conversion latency in [`request_conversion`](Self::request_conversion)
/// and then read any number of devices on the same bus.
pub trait TemperatureProbe {
    /// Start a conversion on all attached devices and wait for it to finish
    fn request_conversion(&mut self) -> Result<(), SensorError>;

    /// Last converted temperature of the `index`-th device, in °C
    fn read_last_celsius(&mut self, index: u8) -> Result<f32, SensorError>;
}

impl<T: TemperatureProbe + ?Sized> TemperatureProbe for &mut T {
    fn request_conversion(&mut self) -> Result<(), SensorError> {
        (**self).request_conversion()
    }

    fn read_last_celsius(&mut self, index: u8) -> Result<f32, SensorError> {
        (**self).read_last_celsius(index)
    }
}
