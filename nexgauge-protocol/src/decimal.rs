//! Fixed-precision decimal rendering
//!
//! Renders an `f32` with a fixed number of fractional digits, rounding half
//! away from zero. No allocation and no `libm`: the value is scaled into an
//! integer and printed as integer part plus zero-padded fraction.

use core::fmt::Write;

use heapless::String;

use crate::command::CommandError;

/// Maximum fractional digits accepted by [`format_decimal`]
pub const MAX_DECIMALS: u8 = 6;

/// Text sent in place of a value that cannot be shown
pub const PLACEHOLDER: &str = "--";

/// Capacity of a rendered value
pub const MAX_VALUE_LEN: usize = 24;

/// A rendered numeric value
pub type ValueString = String<MAX_VALUE_LEN>;

/// Largest scaled magnitude that still prints within [`MAX_VALUE_LEN`]
const MAX_SCALED: f64 = 1.0e18;

/// Render `value` with exactly `decimals` fractional digits
///
/// Non-finite values render as [`PLACEHOLDER`]. A result that rounds to zero
/// is printed without a sign.
pub fn format_decimal(value: f32, decimals: u8) -> Result<ValueString, CommandError> {
    if decimals > MAX_DECIMALS {
        return Err(CommandError::InvalidPrecision);
    }

    let mut out = ValueString::new();

    if !value.is_finite() {
        out.push_str(PLACEHOLDER)
            .map_err(|_| CommandError::ValueOutOfRange)?;
        return Ok(out);
    }

    let scale = 10u64.pow(decimals as u32);
    let magnitude = (value as f64).abs() * scale as f64 + 0.5;
    if magnitude >= MAX_SCALED {
        return Err(CommandError::ValueOutOfRange);
    }

    // Truncation after +0.5 is round-half-away-from-zero on the magnitude
    let scaled = magnitude as u64;
    let negative = value < 0.0 && scaled != 0;

    let int_part = scaled / scale;
    let frac_part = scaled % scale;

    let result = if decimals == 0 {
        write!(out, "{}{}", if negative { "-" } else { "" }, int_part)
    } else {
        write!(
            out,
            "{}{}.{:0width$}",
            if negative { "-" } else { "" },
            int_part,
            frac_part,
            width = decimals as usize
        )
    };
    result.map_err(|_| CommandError::ValueOutOfRange)?;

    Ok(out)
}
