//! 1-wire bus
//!
//! Single-conductor, open-drain bus with one master. Every transaction
//! starts with a reset pulse; devices answer with a presence pulse. Bytes
//! travel least significant bit first.
//!
//! # ROM commands
//!
//! After reset the master addresses devices with a ROM command:
//! - Skip ROM (0xCC): address every device at once
//! - Match ROM (0x55) + 8-byte ROM: address one device
//! - Search ROM (0xF0): enumerate devices bit by bit
//!
//! A function command specific to the device family follows.

mod bitbang;
#[cfg(test)]
pub(crate) mod mock;
mod search;

pub use bitbang::OneWire;
pub use search::RomSearch;

use nexgauge_core::traits::SensorError;

/// ROM command bytes
pub mod cmd {
    /// Enumerate devices
    pub const SEARCH_ROM: u8 = 0xF0;
    /// Address one device by ROM
    pub const MATCH_ROM: u8 = 0x55;
    /// Address every device
    pub const SKIP_ROM: u8 = 0xCC;
}

/// 1-wire bus errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneWireError {
    /// GPIO read or write failed
    Pin,
    /// Line did not return high before a reset
    BusStuckLow,
    /// Received data failed its CRC
    CrcMismatch,
}

impl From<OneWireError> for SensorError {
    fn from(e: OneWireError) -> Self {
        match e {
            OneWireError::CrcMismatch => SensorError::CrcMismatch,
            OneWireError::Pin | OneWireError::BusStuckLow => SensorError::BusFault,
        }
    }
}

/// Bus master operations
///
/// Implementors provide the reset and bit slots; byte transfers are built
/// on top of them.
pub trait OneWireBus {
    /// Issue a reset pulse; returns `true` if any device answered
    fn reset(&mut self) -> Result<bool, OneWireError>;

    /// Write one bit slot
    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError>;

    /// Read one bit slot
    fn read_bit(&mut self) -> Result<bool, OneWireError>;

    /// Write a byte, LSB first
    fn write_byte(&mut self, byte: u8) -> Result<(), OneWireError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Read a byte, LSB first
    fn read_byte(&mut self) -> Result<u8, OneWireError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit()? {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }

    /// Write several bytes
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OneWireError> {
        for &b in bytes {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Fill `buf` from the bus
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), OneWireError> {
        for b in buf.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(())
    }
}

impl<T: OneWireBus + ?Sized> OneWireBus for &mut T {
    fn reset(&mut self) -> Result<bool, OneWireError> {
        T::reset(self)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        T::write_bit(self, bit)
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        T::read_bit(self)
    }
}

/// 64-bit device ROM: family code, 48-bit serial, CRC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rom(pub [u8; 8]);

impl Rom {
    /// Build a ROM from family code and serial, computing the CRC byte
    pub fn from_parts(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = crc8(&bytes[..7]);
        Self(bytes)
    }

    /// Family code (0x28 for DS18B20)
    pub fn family(&self) -> u8 {
        self.0[0]
    }

    /// Whether the CRC byte matches
    pub fn crc_valid(&self) -> bool {
        crc8(&self.0[..7]) == self.0[7]
    }

    /// Raw bytes, in bus order
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, reflected)
///
/// Running it over data followed by its CRC yields zero.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc8_known_rom() {
        // Family 0x02, serial 0x000001B81C
        assert_eq!(crc8(&[0x02, 0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00]), 0xA2);
    }

    #[test]
    fn test_crc8_empty() {
        assert_eq!(crc8(&[]), 0);
    }

    #[test]
    fn test_rom_from_parts() {
        let rom = Rom::from_parts(0x28, [0xFF, 0x64, 0x1E, 0x0F, 0x0A, 0x00]);
        assert_eq!(rom.family(), 0x28);
        assert!(rom.crc_valid());

        let mut corrupt = rom;
        corrupt.0[3] ^= 0x10;
        assert!(!corrupt.crc_valid());
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            SensorError::from(OneWireError::CrcMismatch),
            SensorError::CrcMismatch
        );
        assert_eq!(SensorError::from(OneWireError::Pin), SensorError::BusFault);
    }

    proptest! {
        #[test]
        fn crc_of_data_and_crc_is_zero(data in proptest::collection::vec(any::<u8>(), 0..16)) {
            let mut framed = data.clone();
            framed.push(crc8(&data));
            prop_assert_eq!(crc8(&framed), 0);
        }
    }
}
