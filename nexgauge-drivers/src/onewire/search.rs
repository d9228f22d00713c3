//! ROM search
//!
//! Binary tree walk over the 64 ROM bits. For each bit every device still
//! taking part writes its bit and then its complement; the wired-AND of
//! the line tells the master whether all agree (`01`/`10`), disagree
//! (`00`) or nobody is left (`11`). The master picks a branch, writes it,
//! and devices on the other branch drop out until the next reset.
//!
//! The search remembers the last discrepancy where it took the 0 branch;
//! the next pass takes the 1 branch there, so each call yields a new
//! device until the tree is exhausted.

use super::{cmd, crc8, OneWireBus, OneWireError, Rom};

/// Incremental ROM search state
#[derive(Debug, Clone, Default)]
pub struct RomSearch {
    rom: [u8; 8],
    last_discrepancy: u8,
    done: bool,
}

impl RomSearch {
    /// Start a fresh search
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the next device, or `None` once every device was returned
    pub fn next_device<B: OneWireBus + ?Sized>(
        &mut self,
        bus: &mut B,
    ) -> Result<Option<Rom>, OneWireError> {
        if self.done {
            return Ok(None);
        }

        if !bus.reset()? {
            self.finish();
            return Ok(None);
        }
        bus.write_byte(cmd::SEARCH_ROM)?;

        let mut last_zero = 0u8;
        for bit_number in 1..=64u8 {
            let id_bit = bus.read_bit()?;
            let complement = bus.read_bit()?;

            if id_bit && complement {
                // No device answered this bit
                self.finish();
                return Ok(None);
            }

            let byte = usize::from((bit_number - 1) / 8);
            let mask = 1u8 << ((bit_number - 1) % 8);

            let direction = if id_bit != complement {
                id_bit
            } else {
                let take_one = if bit_number < self.last_discrepancy {
                    self.rom[byte] & mask != 0
                } else {
                    bit_number == self.last_discrepancy
                };
                if !take_one {
                    last_zero = bit_number;
                }
                take_one
            };

            if direction {
                self.rom[byte] |= mask;
            } else {
                self.rom[byte] &= !mask;
            }
            bus.write_bit(direction)?;
        }

        self.last_discrepancy = last_zero;
        if last_zero == 0 {
            self.done = true;
        }

        if crc8(&self.rom[..7]) != self.rom[7] {
            self.finish();
            return Err(OneWireError::CrcMismatch);
        }

        Ok(Some(Rom(self.rom)))
    }

    fn finish(&mut self) {
        self.rom = [0; 8];
        self.last_discrepancy = 0;
        self.done = true;
    }
}
