//! Configuration loading
//!
//! The embedded gauge.toml is parsed and validated at boot. build.rs has
//! already checked it, so the fallback only matters when the parser and
//! the build-time check disagree.

use defmt::*;

use nexgauge_core::config::{parse_config, GaugeConfig};
use nexgauge_core::convert::{max_rpm, max_speed_kmh};

/// Parse and validate `source`, falling back to the tachometer preset
pub fn load(source: &str) -> GaugeConfig {
    let config = match parse_config(source) {
        Ok(config) => config,
        Err(e) => {
            error!("gauge.toml line {}: {}", e.line, e.kind);
            warn!("Using tachometer preset");
            return GaugeConfig::tachometer();
        }
    };

    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            error!("gauge.toml invalid: {}", e);
            warn!("Using tachometer preset");
            GaugeConfig::tachometer()
        }
    }
}

/// Log what the gauge is about to sample
pub fn log_summary(config: &GaugeConfig) {
    info!(
        "Display: UART tx=gpio{} rx=gpio{} @ {} baud",
        config.display.tx_pin, config.display.rx_pin, config.display.baudrate
    );
    if let Some(banner) = &config.display.banner {
        info!("Banner: {}=\"{}\"", banner.field.as_str(), banner.text.as_str());
    }
    if let Some(rpm) = &config.rpm {
        info!(
            "RPM: gpio{} -> {} every {}ms, {} pulse(s)/rev",
            rpm.pin.pin,
            rpm.field.as_str(),
            rpm.interval_ms,
            rpm.pulses_per_revolution
        );
        info!("RPM: counts up to {} RPM", max_rpm(rpm.pulses_per_revolution));
    }
    if let Some(temp) = &config.temperature {
        info!(
            "Temperature: gpio{} -> {} every {}ms, sensor #{} at {} bits",
            temp.pin.pin,
            temp.field.as_str(),
            temp.interval_ms,
            temp.sensor_index,
            temp.resolution_bits
        );
    }
    if let Some(speed) = &config.speed {
        info!(
            "Speed: gpio{} -> {} every {}ms, {} pulse(s)/rev, wheel {}m",
            speed.pin.pin,
            speed.field.as_str(),
            speed.interval_ms,
            speed.pulses_per_revolution,
            speed.wheel_circumference_m
        );
        info!(
            "Speed: counts up to {} km/h",
            max_speed_kmh(speed.wheel_circumference_m, speed.pulses_per_revolution)
        );
    }
}
