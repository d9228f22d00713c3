//! DS18B20 digital thermometer
//!
//! 1-wire sensor with a 9-12 bit conversion. A reading is two steps:
//! Convert T (0x44) to every device, wait for the conversion, then Read
//! Scratchpad (0xBE) from the addressed device.
//!
//! # Scratchpad
//!
//! | Byte | Content                      |
//! |------|------------------------------|
//! | 0-1  | Temperature, LSB first       |
//! | 2-3  | TH / TL alarm registers      |
//! | 4    | Configuration (resolution)   |
//! | 5-7  | Reserved                     |
//! | 8    | CRC of bytes 0-7             |
//!
//! Temperature is a signed 16-bit value in 1/16 °C. Bits below the
//! configured resolution are undefined.
//!
//! Only externally powered devices are supported: completion is detected
//! by polling read slots, which parasite-powered devices cannot answer.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use nexgauge_core::traits::{SensorError, TemperatureProbe};

use crate::onewire::{cmd, crc8, OneWireBus, OneWireError, Rom, RomSearch};

/// DS18B20 family code
pub const FAMILY_CODE: u8 = 0x28;

/// Devices remembered from a bus scan
pub const MAX_DEVICES: usize = 4;

/// Function commands
pub mod func {
    /// Start a temperature conversion
    pub const CONVERT_T: u8 = 0x44;
    /// Read the 9-byte scratchpad
    pub const READ_SCRATCHPAD: u8 = 0xBE;
    /// Write TH, TL and configuration
    pub const WRITE_SCRATCHPAD: u8 = 0x4E;
}

/// Power-on alarm thresholds, kept when writing the configuration
const DEFAULT_TH: u8 = 0x4B;
const DEFAULT_TL: u8 = 0x46;

/// Interval between conversion-complete polls
const POLL_INTERVAL_MS: u32 = 1;

/// Conversion resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 0.5 °C, 93.75 ms
    Bits9,
    /// 0.25 °C, 187.5 ms
    Bits10,
    /// 0.125 °C, 375 ms
    Bits11,
    /// 0.0625 °C, 750 ms
    #[default]
    Bits12,
}

impl Resolution {
    /// Resolution from a bit count (9-12)
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            9 => Some(Resolution::Bits9),
            10 => Some(Resolution::Bits10),
            11 => Some(Resolution::Bits11),
            12 => Some(Resolution::Bits12),
            _ => None,
        }
    }

    /// Resolution encoded in a configuration register
    pub fn from_config(config: u8) -> Self {
        match (config >> 5) & 0x03 {
            0 => Resolution::Bits9,
            1 => Resolution::Bits10,
            2 => Resolution::Bits11,
            _ => Resolution::Bits12,
        }
    }

    /// Configuration register value
    pub fn config_byte(self) -> u8 {
        let r = match self {
            Resolution::Bits9 => 0,
            Resolution::Bits10 => 1,
            Resolution::Bits11 => 2,
            Resolution::Bits12 => 3,
        };
        (r << 5) | 0x1F
    }

    /// Worst-case conversion time, rounded up
    pub fn conversion_time_ms(self) -> u32 {
        match self {
            Resolution::Bits9 => 94,
            Resolution::Bits10 => 188,
            Resolution::Bits11 => 375,
            Resolution::Bits12 => 750,
        }
    }

    /// Mask clearing the undefined low bits of a raw reading
    fn raw_mask(self) -> i16 {
        match self {
            Resolution::Bits9 => !0b111,
            Resolution::Bits10 => !0b011,
            Resolution::Bits11 => !0b001,
            Resolution::Bits12 => !0,
        }
    }
}

/// Decode a scratchpad into °C
///
/// Rejects an all-ones scratchpad (nobody drove the line) and an all-zero
/// one (line held low), both of which would otherwise pass or fail the CRC
/// by accident.
pub fn decode_scratchpad(scratchpad: &[u8; 9]) -> Result<f32, SensorError> {
    if scratchpad.iter().all(|&b| b == 0xFF) || scratchpad.iter().all(|&b| b == 0x00) {
        return Err(SensorError::NoDevice);
    }
    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return Err(SensorError::CrcMismatch);
    }

    let resolution = Resolution::from_config(scratchpad[4]);
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]) & resolution.raw_mask();
    Ok(f32::from(raw) / 16.0)
}

/// DS18B20 sensors on one bus
///
/// Indices follow discovery order of the last [`scan`](Self::scan). A read
/// that finds no device at its index, or gets no answer, or a corrupt one,
/// scans the bus again and retries once, so sensors added or swapped after
/// boot are picked up. Skip ROM is used only when the last scan saw exactly
/// one device of any family.
pub struct Ds18b20<B, D> {
    bus: B,
    delay: D,
    resolution: Resolution,
    devices: Vec<Rom, MAX_DEVICES>,
    /// Devices of every family seen by the last scan
    bus_devices: usize,
}

impl<B: OneWireBus, D: DelayNs> Ds18b20<B, D> {
    /// Create a driver; call [`configure`](Self::configure) to apply the resolution
    pub fn new(bus: B, delay: D, resolution: Resolution) -> Self {
        Self {
            bus,
            delay,
            resolution,
            devices: Vec::new(),
            bus_devices: 0,
        }
    }

    /// Enumerate DS18B20s on the bus
    ///
    /// Other families are skipped. Returns the number of devices found,
    /// at most [`MAX_DEVICES`].
    pub fn scan(&mut self) -> Result<usize, OneWireError> {
        self.devices.clear();
        self.bus_devices = 0;
        let mut search = RomSearch::new();
        while let Some(rom) = search.next_device(&mut self.bus)? {
            self.bus_devices += 1;
            if rom.family() != FAMILY_CODE {
                continue;
            }
            if self.devices.push(rom).is_err() {
                break;
            }
        }
        Ok(self.devices.len())
    }

    /// Write the resolution to every device
    pub fn configure(&mut self) -> Result<(), SensorError> {
        if !self.bus.reset()? {
            return Err(SensorError::NoDevice);
        }
        self.bus.write_byte(cmd::SKIP_ROM)?;
        self.bus.write_bytes(&[
            func::WRITE_SCRATCHPAD,
            DEFAULT_TH,
            DEFAULT_TL,
            self.resolution.config_byte(),
        ])?;
        Ok(())
    }

    /// Discovered devices
    pub fn devices(&self) -> &[Rom] {
        &self.devices
    }

    /// Configured resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Reset and address the device at `index`
    fn select(&mut self, index: u8) -> Result<(), SensorError> {
        let rom = match self.devices.get(usize::from(index)) {
            Some(rom) => *rom,
            None if self.devices.is_empty() => return Err(SensorError::NoDevice),
            None => return Err(SensorError::NotFound),
        };

        if !self.bus.reset()? {
            return Err(SensorError::NoDevice);
        }

        if self.bus_devices == 1 {
            self.bus.write_byte(cmd::SKIP_ROM)?;
        } else {
            self.bus.write_byte(cmd::MATCH_ROM)?;
            self.bus.write_bytes(rom.as_bytes())?;
        }
        Ok(())
    }

    fn read_celsius_at(&mut self, index: u8) -> Result<f32, SensorError> {
        let scratchpad = self.read_scratchpad(index)?;
        decode_scratchpad(&scratchpad)
    }

    /// Read the raw scratchpad of one device
    pub fn read_scratchpad(&mut self, index: u8) -> Result<[u8; 9], SensorError> {
        self.select(index)?;
        self.bus.write_byte(func::READ_SCRATCHPAD)?;
        let mut scratchpad = [0u8; 9];
        self.bus.read_bytes(&mut scratchpad)?;
        Ok(scratchpad)
    }

    /// Release the bus and delay
    pub fn into_inner(self) -> (B, D) {
        (self.bus, self.delay)
    }

    #[cfg(test)]
    fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: OneWireBus, D: DelayNs> TemperatureProbe for Ds18b20<B, D> {
    /// Start a conversion on every device and wait for it to finish
    fn request_conversion(&mut self) -> Result<(), SensorError> {
        if !self.bus.reset()? {
            return Err(SensorError::NoDevice);
        }
        self.bus.write_byte(cmd::SKIP_ROM)?;
        self.bus.write_byte(func::CONVERT_T)?;

        // Devices hold read slots low until the conversion is done
        let limit = self.resolution.conversion_time_ms();
        let mut waited = 0;
        while !self.bus.read_bit()? {
            if waited >= limit {
                return Err(SensorError::BusFault);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS);
            waited += POLL_INTERVAL_MS;
        }
        Ok(())
    }

    /// Read one device, rescanning once if the bus looks changed
    fn read_last_celsius(&mut self, index: u8) -> Result<f32, SensorError> {
        match self.read_celsius_at(index) {
            Err(SensorError::NoDevice | SensorError::NotFound | SensorError::CrcMismatch) => {
                // New devices power up at 12 bits
                if self.scan()? > 0 {
                    self.configure()?;
                }
                self.read_celsius_at(index)
            }
            result => result,
        }
    }
}
