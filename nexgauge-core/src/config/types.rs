//! Configuration type definitions

use heapless::String;
use nexgauge_hal::uart::DISPLAY_BAUDRATE;
use nexgauge_protocol::command::MAX_TEXT_LEN;
use nexgauge_protocol::{FieldId, MAX_DECIMALS};

use crate::scheduler::TaskKind;

/// Lowest supported DS18B20 resolution
pub const MIN_RESOLUTION_BITS: u8 = 9;

/// Highest supported DS18B20 resolution
pub const MAX_RESOLUTION_BITS: u8 = 12;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No periodic task enabled
    NoTasks,
    /// Interval of zero
    ZeroInterval(TaskKind),
    /// Pulses per revolution of zero
    ZeroPulsesPerRevolution(TaskKind),
    /// More fractional digits than the display formatter supports
    InvalidPrecision(TaskKind),
    /// Wheel circumference not a positive finite number
    InvalidCircumference,
    /// Temperature resolution outside 9-12 bits
    InvalidResolution,
    /// Baud rate of zero
    ZeroBaudrate,
    /// Same GPIO assigned twice
    PinConflict(u8),
    /// Task configured but its sensor was not provided
    MissingSensor(TaskKind),
}

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (count falling edges instead of rising)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// Text written to a display field once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BannerConfig {
    /// Target field
    pub field: FieldId,
    /// Text to show
    pub text: String<MAX_TEXT_LEN>,
}

/// Display UART configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayHwConfig {
    /// UART TX pin (to display RX)
    pub tx_pin: u8,
    /// UART RX pin (from display TX)
    pub rx_pin: u8,
    /// Baud rate
    pub baudrate: u32,
    /// Optional start-up text
    pub banner: Option<BannerConfig>,
}

impl Default for DisplayHwConfig {
    fn default() -> Self {
        Self {
            tx_pin: 0,
            rx_pin: 1,
            baudrate: DISPLAY_BAUDRATE,
            banner: None,
        }
    }
}

/// Rotational speed task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RpmTaskConfig {
    /// Display field
    pub field: FieldId,
    /// Pulse sensor input
    pub pin: PinConfig,
    /// Sensor edges per shaft revolution
    pub pulses_per_revolution: u16,
    /// Sampling interval
    pub interval_ms: u32,
    /// Fractional digits shown
    pub decimals: u8,
}

/// Temperature task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureTaskConfig {
    /// Display field
    pub field: FieldId,
    /// 1-wire data line
    pub pin: PinConfig,
    /// Device index on the bus
    pub sensor_index: u8,
    /// Conversion resolution (9-12 bits)
    pub resolution_bits: u8,
    /// Sampling interval
    pub interval_ms: u32,
    /// Fractional digits shown
    pub decimals: u8,
}

/// Vehicle speed task
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedTaskConfig {
    /// Display field
    pub field: FieldId,
    /// Wheel sensor input
    pub pin: PinConfig,
    /// Sensor edges per wheel revolution
    pub pulses_per_revolution: u16,
    /// Wheel rolling circumference in meters
    pub wheel_circumference_m: f32,
    /// Sampling interval
    pub interval_ms: u32,
    /// Fractional digits shown
    pub decimals: u8,
}

/// Built-in hardware variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    /// RPM and temperature
    Tachometer,
    /// RPM, temperature and road speed
    Speedometer,
}

impl Preset {
    /// Parse a preset name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tachometer" => Some(Preset::Tachometer),
            "speedometer" => Some(Preset::Speedometer),
            _ => None,
        }
    }
}

/// Complete gauge configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaugeConfig {
    /// Display link
    pub display: DisplayHwConfig,
    /// RPM task, if fitted
    pub rpm: Option<RpmTaskConfig>,
    /// Temperature task, if fitted
    pub temperature: Option<TemperatureTaskConfig>,
    /// Speed task, if fitted
    pub speed: Option<SpeedTaskConfig>,
}

impl Default for RpmTaskConfig {
    fn default() -> Self {
        Self {
            field: FieldId::text(0),
            pin: PinConfig::with_pullup(2),
            pulses_per_revolution: 1,
            interval_ms: 1000,
            decimals: 0,
        }
    }
}

impl Default for TemperatureTaskConfig {
    fn default() -> Self {
        Self {
            field: FieldId::text(1),
            pin: PinConfig::new(4),
            sensor_index: 0,
            resolution_bits: MAX_RESOLUTION_BITS,
            interval_ms: 2000,
            decimals: 0,
        }
    }
}

impl Default for SpeedTaskConfig {
    fn default() -> Self {
        Self {
            field: FieldId::text(2),
            pin: PinConfig::with_pullup(3),
            pulses_per_revolution: 1,
            wheel_circumference_m: 1.884,
            interval_ms: 1000,
            decimals: 1,
        }
    }
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::preset(Preset::Tachometer)
    }
}

impl GaugeConfig {
    /// Display defaults and no tasks
    pub fn empty() -> Self {
        Self {
            display: DisplayHwConfig::default(),
            rpm: None,
            temperature: None,
            speed: None,
        }
    }

    /// Configuration of a built-in variant
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Tachometer => Self::tachometer(),
            Preset::Speedometer => Self::speedometer(),
        }
    }

    /// RPM on GPIO2 and temperature on GPIO4
    pub fn tachometer() -> Self {
        Self {
            rpm: Some(RpmTaskConfig::default()),
            temperature: Some(TemperatureTaskConfig::default()),
            ..Self::empty()
        }
    }

    /// Tachometer plus road speed on GPIO3
    pub fn speedometer() -> Self {
        Self {
            speed: Some(SpeedTaskConfig::default()),
            ..Self::tachometer()
        }
    }

    /// Whether a task is configured
    pub fn has_task(&self, kind: TaskKind) -> bool {
        match kind {
            TaskKind::Rpm => self.rpm.is_some(),
            TaskKind::Temperature => self.temperature.is_some(),
            TaskKind::Speed => self.speed.is_some(),
        }
    }

    /// Check the configuration for values the sampler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpm.is_none() && self.temperature.is_none() && self.speed.is_none() {
            return Err(ConfigError::NoTasks);
        }

        if self.display.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }

        if let Some(rpm) = &self.rpm {
            check_interval(TaskKind::Rpm, rpm.interval_ms)?;
            check_precision(TaskKind::Rpm, rpm.decimals)?;
            if rpm.pulses_per_revolution == 0 {
                return Err(ConfigError::ZeroPulsesPerRevolution(TaskKind::Rpm));
            }
        }

        if let Some(temp) = &self.temperature {
            check_interval(TaskKind::Temperature, temp.interval_ms)?;
            check_precision(TaskKind::Temperature, temp.decimals)?;
            if !(MIN_RESOLUTION_BITS..=MAX_RESOLUTION_BITS).contains(&temp.resolution_bits) {
                return Err(ConfigError::InvalidResolution);
            }
        }

        if let Some(speed) = &self.speed {
            check_interval(TaskKind::Speed, speed.interval_ms)?;
            check_precision(TaskKind::Speed, speed.decimals)?;
            if speed.pulses_per_revolution == 0 {
                return Err(ConfigError::ZeroPulsesPerRevolution(TaskKind::Speed));
            }
            if !speed.wheel_circumference_m.is_finite() || speed.wheel_circumference_m <= 0.0 {
                return Err(ConfigError::InvalidCircumference);
            }
        }

        self.check_pin_conflicts()
    }

    /// Every GPIO the configuration claims, display first
    pub fn pins(&self) -> heapless::Vec<u8, 5> {
        let mut pins = heapless::Vec::new();
        // Capacity matches the number of pin slots below
        let _ = pins.push(self.display.tx_pin);
        let _ = pins.push(self.display.rx_pin);
        if let Some(rpm) = &self.rpm {
            let _ = pins.push(rpm.pin.pin);
        }
        if let Some(temp) = &self.temperature {
            let _ = pins.push(temp.pin.pin);
        }
        if let Some(speed) = &self.speed {
            let _ = pins.push(speed.pin.pin);
        }
        pins
    }

    fn check_pin_conflicts(&self) -> Result<(), ConfigError> {
        let pins = self.pins();
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::PinConflict(*pin));
            }
        }
        Ok(())
    }
}

fn check_interval(kind: TaskKind, interval_ms: u32) -> Result<(), ConfigError> {
    if interval_ms == 0 {
        Err(ConfigError::ZeroInterval(kind))
    } else {
        Ok(())
    }
}

fn check_precision(kind: TaskKind, decimals: u8) -> Result<(), ConfigError> {
    if decimals > MAX_DECIMALS {
        Err(ConfigError::InvalidPrecision(kind))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(GaugeConfig::tachometer().validate(), Ok(()));
        assert_eq!(GaugeConfig::speedometer().validate(), Ok(()));
    }

    #[test]
    fn test_preset_contents() {
        let tacho = GaugeConfig::tachometer();
        assert!(tacho.has_task(TaskKind::Rpm));
        assert!(tacho.has_task(TaskKind::Temperature));
        assert!(!tacho.has_task(TaskKind::Speed));

        let speedo = GaugeConfig::preset(Preset::Speedometer);
        assert!(speedo.has_task(TaskKind::Speed));
        assert_eq!(speedo.speed.as_ref().unwrap().decimals, 1);
        assert_eq!(speedo.rpm.as_ref().unwrap().decimals, 0);
        assert_eq!(speedo.display.baudrate, 9600);
    }

    #[test]
    fn test_no_tasks() {
        assert_eq!(GaugeConfig::empty().validate(), Err(ConfigError::NoTasks));
    }

    #[test]
    fn test_zero_interval() {
        let mut config = GaugeConfig::tachometer();
        config.temperature.as_mut().unwrap().interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval(TaskKind::Temperature))
        );
    }

    #[test]
    fn test_zero_pulses_per_revolution() {
        let mut config = GaugeConfig::speedometer();
        config.speed.as_mut().unwrap().pulses_per_revolution = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroPulsesPerRevolution(TaskKind::Speed))
        );
    }

    #[test]
    fn test_bad_circumference() {
        let mut config = GaugeConfig::speedometer();
        config.speed.as_mut().unwrap().wheel_circumference_m = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCircumference));
        config.speed.as_mut().unwrap().wheel_circumference_m = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCircumference));
    }

    #[test]
    fn test_bad_resolution_and_precision() {
        let mut config = GaugeConfig::tachometer();
        config.temperature.as_mut().unwrap().resolution_bits = 8;
        assert_eq!(config.validate(), Err(ConfigError::InvalidResolution));

        let mut config = GaugeConfig::tachometer();
        config.rpm.as_mut().unwrap().decimals = MAX_DECIMALS + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPrecision(TaskKind::Rpm))
        );
    }

    #[test]
    fn test_pin_conflict() {
        let mut config = GaugeConfig::speedometer();
        config.speed.as_mut().unwrap().pin.pin = 2; // same as RPM
        assert_eq!(config.validate(), Err(ConfigError::PinConflict(2)));

        let mut config = GaugeConfig::tachometer();
        config.rpm.as_mut().unwrap().pin.pin = 0; // display TX
        assert_eq!(config.validate(), Err(ConfigError::PinConflict(0)));
    }

    #[test]
    fn test_pins_listing() {
        assert_eq!(&GaugeConfig::speedometer().pins()[..], &[0, 1, 2, 4, 3]);
    }
}
