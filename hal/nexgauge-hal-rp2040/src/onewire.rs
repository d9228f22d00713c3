//! Open-drain GPIO for the 1-wire bus
//!
//! The output latch stays low; driving and releasing the line switch the
//! pin between output and input. An external 4.7k pull-up holds the
//! released line high; the internal pull-up can assist on short runs.

use core::convert::Infallible;

use embassy_rp::gpio::{Flex, Pin, Pull};
use embassy_rp::Peri;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Open-drain line built on a flexible GPIO
pub struct OpenDrainPin<'d> {
    pin: Flex<'d>,
}

impl<'d> OpenDrainPin<'d> {
    /// Configure `pin` released (high-impedance)
    pub fn new(pin: Peri<'d, impl Pin>, pull_up: bool) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(if pull_up { Pull::Up } else { Pull::None });
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }
}

impl ErrorType for OpenDrainPin<'_> {
    type Error = Infallible;
}

impl OutputPin for OpenDrainPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_as_output();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_as_input();
        Ok(())
    }
}

impl InputPin for OpenDrainPin<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pin.is_low())
    }
}
