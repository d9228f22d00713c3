//! RP2040-specific HAL for the gauge firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `nexgauge-hal` traits, plus RP2040-specific functionality:
//!
//! - Millisecond clock on the embassy time driver
//! - Blocking display UART
//! - Open-drain GPIO for the 1-wire bus
//! - Edge-counting pulse inputs
//! - Config-driven pin allocation

#![no_std]

pub mod clock;
pub mod onewire;
pub mod pins;
pub mod pulse;
pub mod uart;

pub use clock::EmbassyClock;
pub use onewire::OpenDrainPin;
pub use pins::{DisplayPeripherals, PinBank, PinError};
pub use pulse::PulseInput;
pub use uart::DisplayUart;
