//! Simple TOML parser for dashboard configuration
//!
//! This is a minimal TOML parser that handles only the subset the
//! dashboard configuration uses. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings and escapes
//! - Dotted keys

use heapless::String;

use super::types::DashboardConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a section header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String value does not fit its field
    TooLong,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Wifi,
    Vehicle,
    Exchange,
    Position,
    Ui,
}

/// Parse TOML text into a [`DashboardConfig`]
///
/// Keys that are absent keep their defaults. Unknown keys are ignored so
/// newer files still load on older firmware.
pub fn parse_config(input: &str) -> Result<DashboardConfig, ParseError> {
    let mut config = DashboardConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line)
                .strip_prefix('[')
                .and_then(|h| h.strip_suffix(']'))
                .ok_or(ParseError::InvalidSection)?;
            section = parse_section_header(header)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "wifi" => Ok(Section::Wifi),
        "vehicle" => Ok(Section::Vehicle),
        "exchange" => Ok(Section::Exchange),
        "position" => Ok(Section::Position),
        "ui" => Ok(Section::Ui),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing `# comment` that is not inside a string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim(),
            _ => {}
        }
    }
    value
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a quoted string into a bounded field
fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)?;
    String::try_from(inner).map_err(|_| ParseError::TooLong)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f64, ParseError> {
    let parsed: f64 = value.parse().map_err(|_| ParseError::InvalidValue)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DashboardConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Wifi => match key {
            "ssid" => config.wifi.ssid = parse_string(value)?,
            "password" => config.wifi.password = parse_string(value)?,
            _ => {}
        },
        Section::Vehicle => match key {
            "host" => config.vehicle.host = parse_string(value)?,
            "port" => config.vehicle.port = parse_int(value)?,
            "path" => config.vehicle.path = parse_string(value)?,
            _ => {}
        },
        Section::Exchange => match key {
            "period_ms" => config.exchange.period_ms = parse_int(value)?,
            "timeout_ms" => config.exchange.timeout_ms = parse_int(value)?,
            _ => {}
        },
        Section::Position => match key {
            "period_ms" => config.position.period_ms = parse_int(value)?,
            "timeout_ms" => config.position.timeout_ms = parse_int(value)?,
            "default_latitude" => config.position.default_latitude = parse_float(value)?,
            "default_longitude" => config.position.default_longitude = parse_float(value)?,
            _ => {}
        },
        Section::Ui => match key {
            "refresh_ms" => config.ui.refresh_ms = parse_int(value)?,
            _ => {}
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
# Handheld dashboard
[wifi]
ssid = "Hydroflyer-02"
password = "hunter22"   # WPA2

[vehicle]
host = "192.168.4.1"
port = 80
path = "/Maneuver"

[exchange]
period_ms = 50
timeout_ms = 300

[position]
period_ms = 15000
timeout_ms = 8000
default_latitude = 48.1173
default_longitude = -11.5167

[ui]
refresh_ms = 40
"#;

        let config = parse_config(config_str).unwrap();
        assert_eq!(config.wifi.ssid.as_str(), "Hydroflyer-02");
        assert_eq!(config.wifi.password.as_str(), "hunter22");
        assert_eq!(config.vehicle.port, 80);
        assert_eq!(config.exchange.period_ms, 50);
        assert_eq!(config.exchange.timeout_ms, 300);
        assert_eq!(config.position.timeout_ms, 8000);
        assert_eq!(config.position.default_longitude, -11.5167);
        assert_eq!(config.ui.refresh_ms, 40);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[exchange]\ntimeout_ms = 250\n").unwrap();
        assert_eq!(config.exchange.timeout_ms, 250);
        assert_eq!(config.exchange.period_ms, 40);
        assert_eq!(config, {
            let mut expected = DashboardConfig::default();
            expected.exchange.timeout_ms = 250;
            expected
        });
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_config("[ui]\ntheme = \"dark\"\nrefresh_ms = 20").unwrap();
        assert_eq!(config.ui.refresh_ms, 20);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_config("[motor]"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[wifi"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[wifi]\nssid"), Err(ParseError::InvalidLine));
        assert_eq!(
            parse_config("[vehicle]\nport = 70000"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[vehicle]\nhost = 192.168.4.1"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[position]\ndefault_latitude = inf"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[wifi]\nssid = \"an-ssid-that-is-longer-than-32-bytes\""),
            Err(ParseError::TooLong)
        );
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        let config = parse_config("[wifi]\npassword = \"pa#ss\" # trailing").unwrap();
        assert_eq!(config.wifi.password.as_str(), "pa#ss");
    }
}
