//! Simple TOML parser for gauge configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! gauge configuration. It does NOT support the full TOML grammar, and it
//! needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] and [section.subsection] headers
//! - Integers with `_` digit separators
//! - Pin strings: `gpio2`, `^gpio2` (pull-up), `!gpio2` (inverted)
//! - Comments (# ...)
//!
//! NOT supported:
//! - Escape sequences inside strings
//! - Arrays, inline tables, multi-line strings
//! - Dotted keys outside section headers
//!
//! A root-level `preset = "..."` key seeds the configuration from a
//! built-in variant; sections then override individual fields. A task
//! section with `enabled = false` removes that task.

use heapless::String;
use nexgauge_protocol::FieldId;

use super::types::{
    BannerConfig, GaugeConfig, PinConfig, Preset, RpmTaskConfig, SpeedTaskConfig,
    TemperatureTaskConfig,
};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not `key = value`
    InvalidLine,
    /// Key not valid in this section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Pin string not of the form `gpioN`
    InvalidPin,
    /// Display field id rejected
    InvalidField,
    /// String longer than its destination
    TooLong,
    /// `preset` names no built-in variant
    UnknownPreset,
    /// `preset` given after the first section
    PresetOutsideRoot,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line number (1-based)
    pub line: usize,
    /// Error kind
    pub kind: ParseErrorKind,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Banner,
    Rpm,
    Temperature,
    Speed,
}

/// Parse TOML configuration into a [`GaugeConfig`]
///
/// Without a `preset` key the result starts from [`GaugeConfig::empty`].
/// The result is not validated; call [`GaugeConfig::validate`].
pub fn parse_config(input: &str) -> Result<GaugeConfig, ParseError> {
    let mut config = GaugeConfig::empty();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        // Check for section header
        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(error(line_no, ParseErrorKind::InvalidSection));
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .map_err(|kind| error(line_no, kind))?;
            open_section(section, &mut config);
            continue;
        }

        let (key, value) =
            parse_key_value(line).ok_or_else(|| error(line_no, ParseErrorKind::InvalidLine))?;

        apply_value(section, key, value, &mut config).map_err(|kind| error(line_no, kind))?;
    }

    Ok(config)
}

fn error(line: usize, kind: ParseErrorKind) -> ParseError {
    ParseError { line, kind }
}

/// Parse section header like "rpm" or "display.banner"
fn parse_section_header(header: &str) -> Result<Section, ParseErrorKind> {
    match header.trim() {
        "display" => Ok(Section::Display),
        "display.banner" => Ok(Section::Banner),
        "rpm" => Ok(Section::Rpm),
        "temperature" => Ok(Section::Temperature),
        "speed" => Ok(Section::Speed),
        _ => Err(ParseErrorKind::InvalidSection),
    }
}

/// A task section header enables the task with defaults unless a preset
/// already did
fn open_section(section: Section, config: &mut GaugeConfig) {
    match section {
        Section::Rpm => {
            config.rpm.get_or_insert_with(RpmTaskConfig::default);
        }
        Section::Temperature => {
            config
                .temperature
                .get_or_insert_with(TemperatureTaskConfig::default);
        }
        Section::Speed => {
            config.speed.get_or_insert_with(SpeedTaskConfig::default);
        }
        Section::Banner => {
            config.display.banner.get_or_insert_with(|| BannerConfig {
                field: FieldId::text(0),
                text: String::new(),
            });
        }
        Section::Root | Section::Display => {}
    }
}

/// Remove a trailing `# comment` that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut GaugeConfig,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => match key {
            "preset" => {
                let preset = Preset::from_name(parse_string(value)?)
                    .ok_or(ParseErrorKind::UnknownPreset)?;
                *config = GaugeConfig::preset(preset);
                Ok(())
            }
            _ => Err(ParseErrorKind::UnknownKey),
        },
        Section::Display => {
            let display = &mut config.display;
            match key {
                "tx_pin" => display.tx_pin = parse_pin(value)?.pin,
                "rx_pin" => display.rx_pin = parse_pin(value)?.pin,
                "baudrate" => display.baudrate = parse_int(value)?,
                "preset" => return Err(ParseErrorKind::PresetOutsideRoot),
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Banner => {
            let Some(banner) = config.display.banner.as_mut() else {
                return Ok(());
            };
            match key {
                "field" => banner.field = parse_field(value)?,
                "text" => {
                    banner.text =
                        String::try_from(parse_string(value)?).map_err(|_| ParseErrorKind::TooLong)?
                }
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Rpm => {
            if key == "enabled" {
                if !parse_bool(value)? {
                    config.rpm = None;
                }
                return Ok(());
            }
            // Keys after `enabled = false` are ignored
            let Some(rpm) = config.rpm.as_mut() else {
                return Ok(());
            };
            match key {
                "field" => rpm.field = parse_field(value)?,
                "pin" => rpm.pin = parse_pin(value)?,
                "pulses_per_revolution" => rpm.pulses_per_revolution = parse_int(value)?,
                "interval_ms" => rpm.interval_ms = parse_int(value)?,
                "decimals" => rpm.decimals = parse_int(value)?,
                "preset" => return Err(ParseErrorKind::PresetOutsideRoot),
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Temperature => {
            if key == "enabled" {
                if !parse_bool(value)? {
                    config.temperature = None;
                }
                return Ok(());
            }
            let Some(temp) = config.temperature.as_mut() else {
                return Ok(());
            };
            match key {
                "field" => temp.field = parse_field(value)?,
                "pin" => temp.pin = parse_pin(value)?,
                "sensor_index" => temp.sensor_index = parse_int(value)?,
                "resolution_bits" => temp.resolution_bits = parse_int(value)?,
                "interval_ms" => temp.interval_ms = parse_int(value)?,
                "decimals" => temp.decimals = parse_int(value)?,
                "preset" => return Err(ParseErrorKind::PresetOutsideRoot),
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
        Section::Speed => {
            if key == "enabled" {
                if !parse_bool(value)? {
                    config.speed = None;
                }
                return Ok(());
            }
            let Some(speed) = config.speed.as_mut() else {
                return Ok(());
            };
            match key {
                "field" => speed.field = parse_field(value)?,
                "pin" => speed.pin = parse_pin(value)?,
                "pulses_per_revolution" => speed.pulses_per_revolution = parse_int(value)?,
                "wheel_circumference_m" => speed.wheel_circumference_m = parse_float(value)?,
                "interval_ms" => speed.interval_ms = parse_int(value)?,
                "decimals" => speed.decimals = parse_int(value)?,
                "preset" => return Err(ParseErrorKind::PresetOutsideRoot),
                _ => return Err(ParseErrorKind::UnknownKey),
            }
            Ok(())
        }
    }
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseErrorKind> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        if inner.contains('"') || inner.contains('\\') {
            return Err(ParseErrorKind::InvalidValue);
        }
        Ok(inner)
    } else if value.contains('"') {
        Err(ParseErrorKind::InvalidValue)
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse a non-negative integer, allowing `_` separators
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseErrorKind> {
    let mut acc: u64 = 0;
    let mut digits = 0;
    let mut prev_underscore = true; // disallow a leading underscore

    for b in value.bytes() {
        match b {
            b'0'..=b'9' => {
                acc = acc
                    .checked_mul(10)
                    .and_then(|a| a.checked_add(u64::from(b - b'0')))
                    .ok_or(ParseErrorKind::InvalidValue)?;
                digits += 1;
                prev_underscore = false;
            }
            b'_' if !prev_underscore => prev_underscore = true,
            _ => return Err(ParseErrorKind::InvalidValue),
        }
    }

    if digits == 0 || prev_underscore {
        return Err(ParseErrorKind::InvalidValue);
    }

    T::try_from(acc).map_err(|_| ParseErrorKind::InvalidValue)
}

/// Parse a float value
fn parse_float(value: &str) -> Result<f32, ParseErrorKind> {
    let parsed: f32 = value.parse().map_err(|_| ParseErrorKind::InvalidValue)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

/// Parse a display field id
fn parse_field(value: &str) -> Result<FieldId, ParseErrorKind> {
    FieldId::new(parse_string(value)?).map_err(|_| ParseErrorKind::InvalidField)
}

/// Parse a pin string like "gpio2", "!gpio2", "^gpio2"
fn parse_pin(value: &str) -> Result<PinConfig, ParseErrorKind> {
    let mut s = parse_string(value)?;
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    // Parse "gpioNN"
    let digits = s.strip_prefix("gpio").ok_or(ParseErrorKind::InvalidPin)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidPin);
    }
    let pin: u8 = digits.parse().map_err(|_| ParseErrorKind::InvalidPin)?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TaskKind;
    use proptest::prelude::*;

    const FULL: &str = r#"
# Road gauge with all three sensors
preset = "speedometer"

[display]
tx_pin = "gpio12"
rx_pin = "gpio13"
baudrate = 9_600

[display.banner]
field = "t0"
text = "Iori Fernando"   # shown once at boot

[rpm]
pin = "^gpio6"
pulses_per_revolution = 2
interval_ms = 500

[temperature]
pin = "gpio7"
resolution_bits = 10

[speed]
field = "page0.t2"
wheel_circumference_m = 2.05
decimals = 1
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL).unwrap();

        assert_eq!(config.display.tx_pin, 12);
        assert_eq!(config.display.rx_pin, 13);
        assert_eq!(config.display.baudrate, 9600);

        let banner = config.display.banner.as_ref().unwrap();
        assert_eq!(banner.field.as_str(), "t0");
        assert_eq!(banner.text.as_str(), "Iori Fernando");

        let rpm = config.rpm.as_ref().unwrap();
        assert_eq!(rpm.pin, PinConfig::with_pullup(6));
        assert_eq!(rpm.pulses_per_revolution, 2);
        assert_eq!(rpm.interval_ms, 500);
        assert_eq!(rpm.field.as_str(), "t0");

        let temp = config.temperature.as_ref().unwrap();
        assert_eq!(temp.pin, PinConfig::new(7));
        assert_eq!(temp.resolution_bits, 10);
        assert_eq!(temp.interval_ms, 2000);

        let speed = config.speed.as_ref().unwrap();
        assert_eq!(speed.field.as_str(), "page0.t2");
        assert_eq!(speed.wheel_circumference_m, 2.05);

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_preset_only() {
        let config = parse_config("preset = \"tachometer\"").unwrap();
        assert_eq!(config, GaugeConfig::tachometer());
    }

    #[test]
    fn test_no_preset_starts_empty() {
        let config = parse_config("[rpm]\ninterval_ms = 250\n").unwrap();
        assert_eq!(config.rpm.as_ref().unwrap().interval_ms, 250);
        assert!(!config.has_task(TaskKind::Temperature));
        assert!(!config.has_task(TaskKind::Speed));
    }

    #[test]
    fn test_disable_preset_task() {
        let config = parse_config(
            "preset = \"speedometer\"\n[speed]\nenabled = false\ninterval_ms = 5\n",
        )
        .unwrap();
        assert!(config.speed.is_none());
        assert!(config.rpm.is_some());
    }

    #[test]
    fn test_inverted_pin() {
        let config = parse_config("[rpm]\npin = \"!^gpio9\"\n").unwrap();
        let pin = config.rpm.unwrap().pin;
        assert_eq!(pin.pin, 9);
        assert!(pin.inverted);
        assert!(pin.pull_up);
    }

    #[test]
    fn test_error_line_numbers() {
        let err = parse_config("[rpm]\n\ninterval_ms = fast\n").unwrap_err();
        assert_eq!(
            err,
            ParseError {
                line: 3,
                kind: ParseErrorKind::InvalidValue
            }
        );
    }

    #[test]
    fn test_error_kinds() {
        let kind = |s: &str| parse_config(s).unwrap_err().kind;

        assert_eq!(kind("[heater]"), ParseErrorKind::InvalidSection);
        assert_eq!(kind("[rpm"), ParseErrorKind::InvalidSection);
        assert_eq!(kind("just words"), ParseErrorKind::InvalidLine);
        assert_eq!(kind("[rpm]\ncolour = 1"), ParseErrorKind::UnknownKey);
        assert_eq!(kind("[rpm]\npin = \"pin2\""), ParseErrorKind::InvalidPin);
        assert_eq!(kind("[rpm]\nfield = \"t 0\""), ParseErrorKind::InvalidField);
        assert_eq!(kind("preset = \"boat\""), ParseErrorKind::UnknownPreset);
        assert_eq!(
            kind("[rpm]\npreset = \"tachometer\""),
            ParseErrorKind::PresetOutsideRoot
        );
        assert_eq!(kind("[rpm]\ndecimals = 300"), ParseErrorKind::InvalidValue);
        assert_eq!(kind("[rpm]\ninterval_ms = -5"), ParseErrorKind::InvalidValue);
        assert_eq!(kind("[rpm]\nenabled = yes"), ParseErrorKind::InvalidValue);

        let long_text = "[display.banner]\ntext = \"0123456789012345678901234567890123456789012345678\"";
        assert_eq!(kind(long_text), ParseErrorKind::TooLong);
    }

    #[test]
    fn test_hash_inside_string_is_not_comment() {
        let config = parse_config("[display.banner]\ntext = \"Gauge #1\" # note\n").unwrap();
        assert_eq!(config.display.banner.unwrap().text.as_str(), "Gauge #1");
    }

    #[test]
    fn test_parse_int_separators() {
        assert_eq!(parse_int::<u32>("1_000"), Ok(1000));
        assert_eq!(parse_int::<u32>("115200"), Ok(115_200));
        assert_eq!(parse_int::<u32>("_1"), Err(ParseErrorKind::InvalidValue));
        assert_eq!(parse_int::<u32>("1_"), Err(ParseErrorKind::InvalidValue));
        assert_eq!(parse_int::<u32>("1__0"), Err(ParseErrorKind::InvalidValue));
        assert_eq!(parse_int::<u8>("256"), Err(ParseErrorKind::InvalidValue));
    }

    proptest! {
        #[test]
        fn parser_never_panics(input in "\\PC{0,200}") {
            let _ = parse_config(&input);
        }

        #[test]
        fn interval_round_trips(interval in 1u32..=u32::MAX) {
            let mut text: String<64> = String::new();
            core::fmt::Write::write_fmt(&mut text, format_args!("[rpm]\ninterval_ms = {}\n", interval)).unwrap();
            let config = parse_config(&text).unwrap();
            prop_assert_eq!(config.rpm.unwrap().interval_ms, interval);
        }
    }
}
