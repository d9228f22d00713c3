//! Bit-banged 1-wire master
//!
//! Drives an open-drain GPIO: `set_low` pulls the line down, `set_high`
//! releases it to the external pull-up (4.7k typical). Standard-speed
//! slot timings:
//!
//! | Slot    | Low     | Sample at | Recovery |
//! |---------|---------|-----------|----------|
//! | Reset   | 480 µs  | +70 µs    | 410 µs   |
//! | Write 1 | 6 µs    | -         | 64 µs    |
//! | Write 0 | 60 µs   | -         | 10 µs    |
//! | Read    | 6 µs    | +9 µs     | 55 µs    |
//!
//! The timing-critical part of each slot runs in a critical section so an
//! edge interrupt cannot stretch it. Interrupts latch meanwhile and are
//! serviced between slots.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use super::{OneWireBus, OneWireError};

const RESET_LOW_US: u32 = 480;
const PRESENCE_SAMPLE_US: u32 = 70;
const RESET_RECOVERY_US: u32 = 410;

const WRITE_ONE_LOW_US: u32 = 6;
const WRITE_ONE_RECOVERY_US: u32 = 64;
const WRITE_ZERO_LOW_US: u32 = 60;
const WRITE_ZERO_RECOVERY_US: u32 = 10;

const READ_LOW_US: u32 = 6;
const READ_SAMPLE_US: u32 = 9;
const READ_RECOVERY_US: u32 = 55;

/// Time allowed for the line to float high before a reset
const IDLE_WAIT_US: u32 = 250;

/// Bit-banged 1-wire bus master
pub struct OneWire<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> OneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Take an open-drain pin and release the line
    pub fn new(mut pin: P, delay: D) -> Result<Self, OneWireError> {
        pin.set_high().map_err(|_| OneWireError::Pin)?;
        Ok(Self { pin, delay })
    }

    fn drive_low(&mut self) -> Result<(), OneWireError> {
        self.pin.set_low().map_err(|_| OneWireError::Pin)
    }

    fn release(&mut self) -> Result<(), OneWireError> {
        self.pin.set_high().map_err(|_| OneWireError::Pin)
    }

    fn line_is_high(&mut self) -> Result<bool, OneWireError> {
        self.pin.is_high().map_err(|_| OneWireError::Pin)
    }

    /// Wait for the pull-up to bring an idle line high
    fn wait_idle(&mut self) -> Result<(), OneWireError> {
        self.release()?;
        let mut waited = 0;
        while !self.line_is_high()? {
            if waited >= IDLE_WAIT_US {
                return Err(OneWireError::BusStuckLow);
            }
            self.delay.delay_us(2);
            waited += 2;
        }
        Ok(())
    }
}

impl<P, D> OneWireBus for OneWire<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn reset(&mut self) -> Result<bool, OneWireError> {
        self.wait_idle()?;

        self.drive_low()?;
        self.delay.delay_us(RESET_LOW_US);

        let presence = critical_section::with(|_| {
            self.release()?;
            self.delay.delay_us(PRESENCE_SAMPLE_US);
            // Devices hold the line low to signal presence
            self.line_is_high().map(|high| !high)
        })?;

        self.delay.delay_us(RESET_RECOVERY_US);
        Ok(presence)
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), OneWireError> {
        let (low_us, recovery_us) = if bit {
            (WRITE_ONE_LOW_US, WRITE_ONE_RECOVERY_US)
        } else {
            (WRITE_ZERO_LOW_US, WRITE_ZERO_RECOVERY_US)
        };

        critical_section::with(|_| {
            self.drive_low()?;
            self.delay.delay_us(low_us);
            self.release()
        })?;

        self.delay.delay_us(recovery_us);
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool, OneWireError> {
        let bit = critical_section::with(|_| {
            self.drive_low()?;
            self.delay.delay_us(READ_LOW_US);
            self.release()?;
            self.delay.delay_us(READ_SAMPLE_US);
            self.line_is_high()
        })?;

        self.delay.delay_us(READ_RECOVERY_US);
        Ok(bit)
    }
}
