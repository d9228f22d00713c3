//! Configuration types
//!
//! Board-agnostic configuration structures. The hardware variants
//! are presets of [`GaugeConfig`]; a text config can override any field.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
