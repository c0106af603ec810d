//! Build script for hydroflyer-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates dashboard.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate dashboard.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=dashboard.toml");

    let config_path = Path::new("dashboard.toml");
    if !config_path.exists() {
        fail(
            "dashboard.toml not found",
            &["The firmware embeds dashboard.toml; create one in hydroflyer-firmware/"],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read dashboard.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid TOML syntax in dashboard.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_wifi(&config, &mut errors);
    validate_vehicle(&config, &mut errors);
    validate_timing(&config, &mut errors);
    validate_position(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid dashboard configuration", &errors[..]);
    }

    println!("cargo:warning=dashboard.toml validated successfully");
}

const SECTIONS: [&str; 5] = ["wifi", "vehicle", "exchange", "position", "ui"];

/// Only known sections, each a table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn validate_wifi(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(ssid) = string(config, "wifi", "ssid", errors) {
        if ssid.is_empty() || ssid.len() > 32 {
            errors.push("[wifi] ssid must be 1-32 bytes".to_string());
        }
    }
    if let Some(password) = string(config, "wifi", "password", errors) {
        if !password.is_empty() && !(8..=63).contains(&password.len()) {
            errors.push("[wifi] password must be empty (open) or 8-63 bytes".to_string());
        }
    }
}

fn validate_vehicle(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(host) = string(config, "vehicle", "host", errors) {
        if host.parse::<Ipv4Addr>().is_err() {
            errors.push(format!("[vehicle] host '{}' is not an IPv4 address", host));
        }
    }
    if let Some(port) = integer(config, "vehicle", "port", errors) {
        if !(1..=65535).contains(&port) {
            errors.push("[vehicle] port must be 1-65535".to_string());
        }
    }
    if let Some(path) = string(config, "vehicle", "path", errors) {
        if !path.starts_with('/') || path.len() > 32 {
            errors.push("[vehicle] path must start with '/' and be at most 32 bytes".to_string());
        }
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key) in [
        ("exchange", "period_ms"),
        ("exchange", "timeout_ms"),
        ("position", "period_ms"),
        ("position", "timeout_ms"),
        ("ui", "refresh_ms"),
    ] {
        if let Some(ms) = integer(config, section, key, errors) {
            if !(1..=u32::MAX as i64).contains(&ms) {
                errors.push(format!("[{}] {} must be a positive u32", section, key));
            }
        }
    }
}

fn validate_position(config: &toml::Value, errors: &mut Vec<String>) {
    for (key, limit) in [("default_latitude", 90.0), ("default_longitude", 180.0)] {
        if let Some(value) = float(config, "position", key, errors) {
            if !(-limit..=limit).contains(&value) {
                errors.push(format!("[position] {} must be within ±{}", key, limit));
            }
        }
    }
}

fn string<'a>(
    config: &'a toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    let value = config.get(section)?.get(key)?;
    let s = value.as_str();
    if s.is_none() {
        errors.push(format!("[{}] {} must be a string", section, key));
    }
    s
}

fn integer(
    config: &toml::Value,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<i64> {
    let value = config.get(section)?.get(key)?;
    let i = value.as_integer();
    if i.is_none() {
        errors.push(format!("[{}] {} must be an integer", section, key));
    }
    i
}

fn float(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Option<f64> {
    let value = config.get(section)?.get(key)?;
    let f = value.as_float().or_else(|| value.as_integer().map(|i| i as f64));
    if f.is_none() {
        errors.push(format!("[{}] {} must be a number", section, key));
    }
    f
}

/// Abort the build with a boxed error message
fn fail<S: AsRef<str>>(title: &str, lines: &[S]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
