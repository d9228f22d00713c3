//! Config-driven pin allocation
//!
//! The display UART is board wiring: UART0 with TX on GPIO0 and RX on
//! GPIO1. Every other GPIO goes into a [`PinBank`] and is taken by number
//! as the configuration asks for it.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};

/// GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Display UART TX (to display RX)
pub const DISPLAY_TX_PIN: u8 = 0;

/// Display UART RX (from display TX)
pub const DISPLAY_RX_PIN: u8 = 1;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin wired to the display UART
    Reserved,
}

/// Display UART and its pins
pub struct DisplayPeripherals {
    pub uart: Peri<'static, UART0>,
    pub tx: Peri<'static, PIN_0>,
    pub rx: Peri<'static, PIN_1>,
}

/// GPIOs available to sensors, taken by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Split the chip peripherals into the display UART and the pin bank
    pub fn split(p: Peripherals) -> (DisplayPeripherals, Self) {
        let display = DisplayPeripherals {
            uart: p.UART0,
            tx: p.PIN_0,
            rx: p.PIN_1,
        };

        let bank = Self {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };

        (display, bank)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        check_pin(pin_num)?;
        self.pins[usize::from(pin_num)]
            .take()
            .ok_or(PinError::AlreadyTaken)
    }
}

/// Range and reservation check, independent of bank state
pub fn check_pin(pin_num: u8) -> Result<(), PinError> {
    if usize::from(pin_num) >= GPIO_COUNT {
        Err(PinError::InvalidPin)
    } else if pin_num == DISPLAY_TX_PIN || pin_num == DISPLAY_RX_PIN {
        Err(PinError::Reserved)
    } else {
        Ok(())
    }
}

/// Check that the configured display pins match the board wiring
pub fn check_display_pins(tx_pin: u8, rx_pin: u8) -> Result<(), PinError> {
    if tx_pin == DISPLAY_TX_PIN && rx_pin == DISPLAY_RX_PIN {
        Ok(())
    } else {
        Err(PinError::Reserved)
    }
}
