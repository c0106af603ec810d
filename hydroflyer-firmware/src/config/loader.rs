//! Embedded configuration loader
//!
//! Parses and validates the embedded TOML. Falls back to built-in defaults
//! if either step fails, so a bad file never keeps the handheld from
//! booting.

use defmt::*;

use hydroflyer_core::config::{parse_config, DashboardConfig};

/// Embedded configuration (compiled into firmware)
/// Edit dashboard.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../dashboard.toml");

/// Load the dashboard configuration
pub fn load_config() -> DashboardConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            return DashboardConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("Embedded config rejected: {:?}", e);
        error!("Using built-in defaults");
        return DashboardConfig::default();
    }

    log_config_summary(&config);
    config
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &DashboardConfig) {
    info!("Configuration loaded successfully");
    debug!("  wifi: ssid={}", config.wifi.ssid.as_str());
    debug!(
        "  vehicle: {}:{}{}",
        config.vehicle.host.as_str(),
        config.vehicle.port,
        config.vehicle.path.as_str()
    );
    debug!(
        "  exchange: every {}ms, timeout {}ms",
        config.exchange.period_ms, config.exchange.timeout_ms
    );
    debug!(
        "  position: every {}ms, timeout {}ms",
        config.position.period_ms, config.position.timeout_ms
    );
    debug!("  ui: every {}ms", config.ui.refresh_ms);
}
