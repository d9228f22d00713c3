//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in nexgauge-core for the gauge's sensors:
//!
//! - 1-wire bus master (bit-banged over an open-drain GPIO)
//! - 1-wire ROM search
//! - DS18B20 digital thermometer

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod onewire;
pub mod sensor;
