//! Configuration type definitions

use core::net::Ipv4Addr;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::DEFAULT_POSITION;
use crate::traits::GeoPosition;

/// Maximum SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum vehicle host length
pub const MAX_HOST_LEN: usize = 32;

/// Maximum endpoint path length
pub const MAX_PATH_LEN: usize = 32;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `wifi.ssid` is empty
    EmptySsid,
    /// `vehicle.host` is not an IPv4 address
    InvalidHost,
    /// `vehicle.port` is zero
    InvalidPort,
    /// `vehicle.path` does not start with `/`
    InvalidPath,
    /// A loop period is zero
    ZeroPeriod,
    /// A timeout is zero
    ZeroTimeout,
    /// Default position is out of range
    InvalidDefaultPosition,
}

/// Access point the handheld joins
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    /// Empty for an open network
    pub password: String<MAX_PASSWORD_LEN>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        let mut ssid = String::new();
        let _ = ssid.push_str("Hydroflyer");
        Self {
            ssid,
            password: String::new(),
        }
    }
}

/// Vehicle endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleConfig {
    /// IPv4 address of the vehicle on its own access point
    pub host: String<MAX_HOST_LEN>,
    pub port: u16,
    /// Resource that takes the command query
    pub path: String<MAX_PATH_LEN>,
}

impl VehicleConfig {
    /// Host parsed as an IPv4 address
    pub fn address(&self) -> Option<Ipv4Addr> {
        self.host.parse().ok()
    }
}

impl Default for VehicleConfig {
    fn default() -> Self {
        let mut host = String::new();
        let _ = host.push_str("192.168.4.1");
        let mut path = String::new();
        let _ = path.push_str("/Maneuver");
        Self {
            host,
            port: 80,
            path,
        }
    }
}

/// Exchange loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExchangeConfig {
    /// Nominal tick period
    pub period_ms: u32,
    /// Bound on one request/response
    pub timeout_ms: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            period_ms: 40,
            timeout_ms: 500,
        }
    }
}

/// Position loop timing and fallback position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PositionConfig {
    pub period_ms: u32,
    pub timeout_ms: u32,
    /// Shown until the first fix
    pub default_latitude: f64,
    pub default_longitude: f64,
}

impl PositionConfig {
    /// Fallback position as a [`GeoPosition`]
    pub fn default_position(&self) -> GeoPosition {
        GeoPosition::new(self.default_latitude, self.default_longitude)
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            period_ms: 15_000,
            timeout_ms: 10_000,
            default_latitude: DEFAULT_POSITION.latitude,
            default_longitude: DEFAULT_POSITION.longitude,
        }
    }
}

/// UI consumer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    /// Consumer refresh period
    pub refresh_ms: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { refresh_ms: 40 }
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DashboardConfig {
    pub wifi: WifiConfig,
    pub vehicle: VehicleConfig,
    pub exchange: ExchangeConfig,
    pub position: PositionConfig,
    pub ui: UiConfig,
}

impl DashboardConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check values the parser cannot reject on type alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if self.vehicle.address().is_none() {
            return Err(ConfigError::InvalidHost);
        }
        if self.vehicle.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if !self.vehicle.path.starts_with('/') {
            return Err(ConfigError::InvalidPath);
        }
        if self.exchange.period_ms == 0 || self.position.period_ms == 0 || self.ui.refresh_ms == 0
        {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.exchange.timeout_ms == 0 || self.position.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self.position.default_position().is_valid() {
            return Err(ConfigError::InvalidDefaultPosition);
        }
        Ok(())
    }
}
