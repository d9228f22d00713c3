//! Pulse count to physical unit conversion
//!
//! Pure functions; the caller supplies the counting window. The constants
//! are the unit definitions themselves and must not be tuned.

use crate::pulse::MAX_EDGE_RATE_HZ;

/// Milliseconds per minute
pub const MS_PER_MINUTE: f32 = 60_000.0;

/// Milliseconds per second
pub const MS_PER_SECOND: f32 = 1_000.0;

/// km/h per m/s
pub const MPS_TO_KMH: f32 = 3.6;

/// Revolutions per minute from `pulse_count` edges over `interval_ms`
///
/// `rpm = pulse_count * 60000 / (interval_ms * pulses_per_revolution)`.
/// Returns `0.0` for zero pulses, and for a zero interval or zero
/// pulses-per-revolution instead of a non-finite value.
pub fn rpm_from(pulse_count: u32, interval_ms: u32, pulses_per_revolution: u16) -> f32 {
    if pulse_count == 0 || interval_ms == 0 || pulses_per_revolution == 0 {
        return 0.0;
    }

    pulse_count as f32 * MS_PER_MINUTE / (interval_ms as f32 * pulses_per_revolution as f32)
}

/// Highest RPM the edge counter resolves with `pulses_per_revolution` edges per turn
pub fn max_rpm(pulses_per_revolution: u16) -> f32 {
    MAX_EDGE_RATE_HZ as f32 * MS_PER_MINUTE / MS_PER_SECOND / pulses_per_revolution.max(1) as f32
}

/// Highest speed the edge counter resolves for the given wheel
pub fn max_speed_kmh(wheel_circumference_m: f32, pulses_per_revolution: u16) -> f32 {
    speed_kmh(
        MAX_EDGE_RATE_HZ,
        MS_PER_SECOND as u32,
        wheel_circumference_m,
        pulses_per_revolution,
    )
}

/// Linear speed in km/h from `pulse_count` wheel edges over `interval_ms`
///
/// Distance is `pulse_count * wheel_circumference_m / pulses_per_revolution`
/// meters, elapsed time `interval_ms / 1000` seconds.
pub fn speed_kmh(
    pulse_count: u32,
    interval_ms: u32,
    wheel_circumference_m: f32,
    pulses_per_revolution: u16,
) -> f32 {
    if pulse_count == 0 || interval_ms == 0 || pulses_per_revolution == 0 {
        return 0.0;
    }

    let meters = pulse_count as f32 * wheel_circumference_m / pulses_per_revolution as f32;
    let seconds = interval_ms as f32 / MS_PER_SECOND;
    meters / seconds * MPS_TO_KMH
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4 * b.abs().max(1.0)
    }

    #[test]
    fn test_rpm_one_pulse_per_rev() {
        // 50 pulses in 1s = 50 rev/s = 3000 RPM
        assert!(approx(rpm_from(50, 1000, 1), 3000.0));
    }

    #[test]
    fn test_rpm_multiple_pulses_per_rev() {
        // 4 magnets, 200 pulses in 500ms = 50 revolutions per 0.5s = 6000 RPM
        assert!(approx(rpm_from(200, 500, 4), 6000.0));
    }

    #[test]
    fn test_rpm_zero_pulses() {
        assert_eq!(rpm_from(0, 1000, 1), 0.0);
        assert_eq!(rpm_from(0, 1, 8), 0.0);
    }

    #[test]
    fn test_rpm_degenerate_window() {
        assert_eq!(rpm_from(10, 0, 1), 0.0);
        assert_eq!(rpm_from(10, 1000, 0), 0.0);
    }

    #[test]
    fn test_speed_reference() {
        // 10 revolutions of a 2m wheel in 1s = 20 m/s = 72 km/h
        assert!(approx(speed_kmh(10, 1000, 2.0, 1), 72.0));
        // Same distance with 2 pulses per revolution
        assert!(approx(speed_kmh(20, 1000, 2.0, 2), 72.0));
        // Half the window doubles the speed
        assert!(approx(speed_kmh(10, 500, 2.0, 1), 144.0));
    }

    #[test]
    fn test_speed_zero() {
        assert_eq!(speed_kmh(0, 1000, 1.9, 1), 0.0);
        assert_eq!(speed_kmh(5, 0, 1.9, 1), 0.0);
    }

    #[test]
    fn test_counter_ceiling() {
        // 10 kHz at one edge per turn is 600k RPM
        assert!(approx(max_rpm(1), 600_000.0));
        assert!(approx(max_rpm(4), 150_000.0));
        assert!(approx(max_rpm(0), max_rpm(1)));
        // 10k revolutions of a 2m wheel per second
        assert!(approx(max_speed_kmh(2.0, 1), 72_000.0));
        assert!(approx(rpm_from(MAX_EDGE_RATE_HZ, 1000, 2), max_rpm(2)));
    }

    proptest! {
        #[test]
        fn rpm_matches_definition(count in 0u32..1_000_000, interval in 1u32..100_000) {
            let expected = if count == 0 {
                0.0
            } else {
                count as f32 * 60000.0 / interval as f32
            };
            prop_assert_eq!(rpm_from(count, interval, 1), expected);
        }

        #[test]
        fn rpm_zero_for_any_interval(interval in 1u32..=u32::MAX) {
            prop_assert_eq!(rpm_from(0, interval, 1), 0.0);
        }

        #[test]
        fn speed_monotonic_in_count(
            count in 0u32..1_000_000,
            extra in 0u32..1_000,
            interval in 1u32..100_000,
            circumference in 0.1f32..5.0,
        ) {
            let lower = speed_kmh(count, interval, circumference, 1);
            let higher = speed_kmh(count + extra, interval, circumference, 1);
            prop_assert!(higher >= lower);
        }
    }
}
