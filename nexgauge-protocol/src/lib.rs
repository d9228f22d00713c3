//! Display Text Command Protocol
//!
//! This crate builds the commands sent from the gauge controller to the
//! serial touchscreen display. The display owns all layout; the controller
//! only assigns text to named fields.
//!
//! # Protocol Overview
//!
//! Every command is plain ASCII followed by three terminator bytes:
//! ```text
//! ┌──────────┬────────┬─────────────┬──────────────┐
//! │ FIELD ID │ .txt=" │ VALUE       │ " FF FF FF   │
//! │ 1–16B    │ 6B     │ 0–96B       │ 4B           │
//! └──────────┴────────┴─────────────┴──────────────┘
//! ```
//!
//! There is no framing, checksum or acknowledgement. The formatter has no
//! transport awareness: callers encode into a buffer and hand the bytes to
//! whatever serial sink they own.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod decimal;

pub use command::{format, CommandError, DisplayCommand, FieldId, MAX_COMMAND_LEN, TERMINATOR};
pub use decimal::{format_decimal, ValueString, MAX_DECIMALS, PLACEHOLDER};
