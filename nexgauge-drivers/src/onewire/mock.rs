//! Simulated 1-wire bus for tests
//!
//! Models devices at the bit level: ROM commands, search with wired-AND
//! arbitration, and the DS18B20 scratchpad commands.

use std::collections::VecDeque;
use std::vec::Vec;

use super::{cmd, crc8, OneWireBus, OneWireError, Rom};

/// One device on the simulated bus
#[derive(Debug, Clone)]
pub struct SimDevice {
    pub rom: Rom,
    pub scratchpad: [u8; 9],
    /// Value latched into the scratchpad on Convert T
    pub temperature_c: f32,
    pub present: bool,
}

impl SimDevice {
    /// DS18B20 in its power-on state (85 °C, 12-bit)
    pub fn ds18b20(rom: Rom, temperature_c: f32) -> Self {
        let mut scratchpad = [0x50, 0x05, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0];
        seal(&mut scratchpad);
        Self {
            rom,
            scratchpad,
            temperature_c,
            present: true,
        }
    }

    fn rom_bit(&self, i: u8) -> bool {
        self.rom.0[usize::from(i / 8)] & (1 << (i % 8)) != 0
    }

    fn convert(&mut self) {
        let undefined_bits = match (self.scratchpad[4] >> 5) & 0x03 {
            0 => 0b111,
            1 => 0b011,
            2 => 0b001,
            _ => 0,
        };
        let raw = (self.temperature_c * 16.0) as i16 & !undefined_bits;
        let [lsb, msb] = raw.to_le_bytes();
        self.scratchpad[0] = lsb;
        self.scratchpad[1] = msb;
        seal(&mut self.scratchpad);
    }
}

/// Recompute the scratchpad CRC byte
pub fn seal(scratchpad: &mut [u8; 9]) {
    scratchpad[8] = crc8(&scratchpad[..8]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    RomCommand,
    MatchRom,
    Search,
    Function,
    WriteScratchpad,
}

/// Bus with simulated devices attached
pub struct SimBus {
    pub devices: Vec<SimDevice>,
    /// Reset pulses issued
    pub resets: usize,
    /// Bytes written outside search arbitration
    pub written: Vec<u8>,
    /// Busy read slots after each Convert T
    pub conversion_polls: usize,
    active: Vec<bool>,
    phase: Phase,
    in_byte: u8,
    in_bits: u8,
    out: VecDeque<bool>,
    search_bit: u8,
    collected: Vec<u8>,
    busy: usize,
}

impl SimBus {
    pub fn new(devices: Vec<SimDevice>) -> Self {
        Self {
            devices,
            resets: 0,
            written: Vec::new(),
            conversion_polls: 0,
            active: Vec::new(),
            phase: Phase::Idle,
            in_byte: 0,
            in_bits: 0,
            out: VecDeque::new(),
            search_bit: 0,
            collected: Vec::new(),
            busy: 0,
        }
    }

    fn active_devices(&mut self) -> impl Iterator<Item = &mut SimDevice> {
        self.devices
            .iter_mut()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .map(|(d, _)| d)
    }

    fn push_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.out.push_back(byte & (1 << i) != 0);
        }
    }

    /// Wired-AND of the active devices' bytes
    fn push_and(&mut self, f: impl Fn(&SimDevice) -> Vec<u8>, len: usize) {
        let mut acc = std::vec![0xFFu8; len];
        for dev in self.active_devices() {
            for (a, b) in acc.iter_mut().zip(f(dev)) {
                *a &= b;
            }
        }
        for b in acc {
            self.push_byte(b);
        }
    }

    fn push_search_pair(&mut self) {
        let i = self.search_bit;
        let mut bit = true;
        let mut complement = true;
        for dev in self.active_devices() {
            bit &= dev.rom_bit(i);
            complement &= !dev.rom_bit(i);
        }
        self.out.push_back(bit);
        self.out.push_back(complement);
    }

    fn on_byte(&mut self, byte: u8) {
        self.written.push(byte);
        match self.phase {
            Phase::RomCommand => match byte {
                cmd::SKIP_ROM => self.phase = Phase::Function,
                cmd::MATCH_ROM => {
                    self.collected.clear();
                    self.phase = Phase::MatchRom;
                }
                cmd::SEARCH_ROM => {
                    self.search_bit = 0;
                    self.phase = Phase::Search;
                    self.push_search_pair();
                }
                _ => self.phase = Phase::Idle,
            },
            Phase::MatchRom => {
                self.collected.push(byte);
                if self.collected.len() == 8 {
                    for (dev, active) in self.devices.iter().zip(self.active.iter_mut()) {
                        *active &= dev.rom.0[..] == self.collected[..];
                    }
                    self.phase = Phase::Function;
                }
            }
            Phase::Function => match byte {
                // Read Scratchpad
                0xBE => {
                    self.push_and(|d| d.scratchpad.to_vec(), 9);
                    self.phase = Phase::Idle;
                }
                // Convert T
                0x44 => {
                    for dev in self.active_devices() {
                        dev.convert();
                    }
                    self.busy = self.conversion_polls;
                    self.phase = Phase::Idle;
                }
                // Write Scratchpad
                0x4E => {
                    self.collected.clear();
                    self.phase = Phase::WriteScratchpad;
                }
                _ => self.phase = Phase::Idle,
            },
            Phase::WriteScratchpad => {
                self.collected.push(byte);
                if self.collected.len() == 3 {
                    let data = [self.collected[0], self.collected[1], self.collected[2]];
                    for dev in self.active_devices() {
                        dev.scratchpad[2..5].copy_from_slice(&data);
                        seal(&mut dev.scratchpad);
                    }
                    self.phase = Phase::Idle;
                }
            }
            Phase::Idle | Phase::Search => {}
        }
    }
}

impl OneWireBus for SimBus {
    fn reset(&mut self) -> Result<bool, OneWireError> {
        self.resets += 1;
        self.active = self.devices.iter().map(|d| d.present).collect();
        self.phase = Phase::RomCommand;
        self.in_byte = 0;
        self.in_bits = 0;
        self.out.clear();
        self.collected.clear();
        self.busy = 0;
        Ok(self.active.iter().any(|&a| a))
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        if self.phase == Phase::Search {
            let i = self.search_bit;
            for (dev, active) in self.devices.iter().zip(self.active.iter_mut()) {
                if dev.rom_bit(i) != bit {
                    *active = false;
                }
            }
            self.search_bit += 1;
            if self.search_bit < 64 {
                self.push_search_pair();
            } else {
                self.phase = Phase::Idle;
            }
            return Ok(());
        }

        if bit {
            self.in_byte |= 1 << self.in_bits;
        }
        self.in_bits += 1;
        if self.in_bits == 8 {
            let byte = self.in_byte;
            self.in_byte = 0;
            self.in_bits = 0;
            self.on_byte(byte);
        }
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        if let Some(bit) = self.out.pop_front() {
            return Ok(bit);
        }
        if self.busy > 0 {
            self.busy -= 1;
            return Ok(false);
        }
        // Released line floats high
        Ok(true)
    }
}
