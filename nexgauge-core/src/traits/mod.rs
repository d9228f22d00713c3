//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and sensor drivers.

pub mod sensor;

pub use sensor::{SensorError, TemperatureProbe};
