//! GPIO configuration types
//!
//! Chip HALs translate these into their own pin configuration when
//! building pulse inputs and the 1-wire line.

/// Input bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Floating input (external bias)
    None,
    /// Internal pull-up, line idles high
    #[default]
    Up,
    /// Internal pull-down, line idles low
    Down,
}

/// Edge that triggers a pulse count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low-to-high transition
    #[default]
    Rising,
    /// High-to-low transition
    Falling,
}

impl Edge {
    /// Counted edge for an active-high or active-low (inverted) sensor
    pub const fn from_inverted(inverted: bool) -> Self {
        if inverted {
            Edge::Falling
        } else {
            Edge::Rising
        }
    }
}

impl Pull {
    /// Bias from a config pull-up flag
    pub const fn from_pull_up(pull_up: bool) -> Self {
        if pull_up {
            Pull::Up
        } else {
            Pull::None
        }
    }
}
