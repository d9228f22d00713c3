//! Build script for nexgauge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates gauge.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use nexgauge_core::config::parse_config;

/// Keys accepted per section, with the TOML type each must have
const ROOT_KEYS: &[(&str, Kind)] = &[("preset", Kind::Str)];
const DISPLAY_KEYS: &[(&str, Kind)] = &[
    ("tx_pin", Kind::Str),
    ("rx_pin", Kind::Str),
    ("baudrate", Kind::Int),
];
const BANNER_KEYS: &[(&str, Kind)] = &[("field", Kind::Str), ("text", Kind::Str)];
const RPM_KEYS: &[(&str, Kind)] = &[
    ("enabled", Kind::Bool),
    ("field", Kind::Str),
    ("pin", Kind::Str),
    ("pulses_per_revolution", Kind::Int),
    ("interval_ms", Kind::Int),
    ("decimals", Kind::Int),
];
const TEMPERATURE_KEYS: &[(&str, Kind)] = &[
    ("enabled", Kind::Bool),
    ("field", Kind::Str),
    ("pin", Kind::Str),
    ("sensor_index", Kind::Int),
    ("resolution_bits", Kind::Int),
    ("interval_ms", Kind::Int),
    ("decimals", Kind::Int),
];
const SPEED_KEYS: &[(&str, Kind)] = &[
    ("enabled", Kind::Bool),
    ("field", Kind::Str),
    ("pin", Kind::Str),
    ("pulses_per_revolution", Kind::Int),
    ("wheel_circumference_m", Kind::Number),
    ("interval_ms", Kind::Int),
    ("decimals", Kind::Int),
];

#[derive(Clone, Copy)]
enum Kind {
    Str,
    Int,
    Number,
    Bool,
}

impl Kind {
    fn matches(self, value: &toml::Value) -> bool {
        match self {
            Kind::Str => value.is_str(),
            Kind::Int => value.is_integer(),
            Kind::Number => value.is_float() || value.is_integer(),
            Kind::Bool => value.is_bool(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Kind::Str => "a string",
            Kind::Int => "an integer",
            Kind::Number => "a number",
            Kind::Bool => "true or false",
        }
    }
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate gauge.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=gauge.toml");

    let config_path = Path::new("gauge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gauge.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a gauge.toml configuration file.            ║\n\
            ║  Please create one in the nexgauge-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read gauge.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gauge.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = check_structure(&config);
    if !errors.is_empty() {
        report("Invalid structure in gauge.toml", &errors);
    }

    // The firmware's own parser must accept the file too
    let gauge = match parse_config(&config_content) {
        Ok(gauge) => gauge,
        Err(e) => report(
            "gauge.toml rejected by the firmware parser",
            &[format!("line {}: {:?}", e.line, e.kind)],
        ),
    };

    if let Err(e) = gauge.validate() {
        report("Invalid gauge configuration", &[format!("{:?}", e)]);
    }

    println!("cargo:warning=gauge.toml validated successfully");
}

/// Check section names, key names and value types
fn check_structure(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let root = match config.as_table() {
        Some(t) => t,
        None => return errors,
    };

    for (key, value) in root {
        match key.as_str() {
            "display" => check_table(&mut errors, "display", value, DISPLAY_KEYS, &["banner"]),
            "rpm" => check_table(&mut errors, "rpm", value, RPM_KEYS, &[]),
            "temperature" => check_table(&mut errors, "temperature", value, TEMPERATURE_KEYS, &[]),
            "speed" => check_table(&mut errors, "speed", value, SPEED_KEYS, &[]),
            _ => check_key(&mut errors, "root", key, value, ROOT_KEYS),
        }
    }

    if let Some(banner) = config.get("display").and_then(|d| d.get("banner")) {
        check_table(&mut errors, "display.banner", banner, BANNER_KEYS, &[]);
    }

    errors
}

fn check_table(
    errors: &mut Vec<String>,
    section: &str,
    value: &toml::Value,
    keys: &[(&str, Kind)],
    subsections: &[&str],
) {
    let table = match value.as_table() {
        Some(t) => t,
        None => {
            errors.push(format!("[{}] must be a table", section));
            return;
        }
    };

    for (key, value) in table {
        if subsections.contains(&key.as_str()) {
            continue;
        }
        check_key(errors, section, key, value, keys);
    }
}

fn check_key(
    errors: &mut Vec<String>,
    section: &str,
    key: &str,
    value: &toml::Value,
    keys: &[(&str, Kind)],
) {
    match keys.iter().find(|(name, _)| *name == key) {
        Some((_, kind)) if !kind.matches(value) => {
            errors.push(format!("[{}] '{}' must be {}", section, key, kind.name()));
        }
        Some(_) => {}
        None => errors.push(format!("[{}] unknown key '{}'", section, key)),
    }
}

/// Abort the build with a boxed list of errors
fn report(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
