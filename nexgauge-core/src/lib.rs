//! Board-agnostic core logic for the gauge firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Interrupt-safe pulse counters
//! - Unit conversion (pulses to RPM and km/h)
//! - Temperature reading with disconnected-sensor handling
//! - Display link that turns readings into display commands
//! - Cooperative sample scheduler
//! - Configuration types, presets and parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod convert;
pub mod display;
pub mod pulse;
pub mod scheduler;
pub mod temperature;
pub mod traits;
