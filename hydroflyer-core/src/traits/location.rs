//! Own-position provider trait

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Errors from a location fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LocationError {
    /// Provider did not answer within the configured bound
    Timeout,
    /// Provider answered but has no fix
    NoFix,
    /// Underlying I/O failed
    Io,
    /// Fix coordinates are out of range or not finite
    InvalidFix,
}

/// A single geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPosition {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl GeoPosition {
    /// Create a position
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and in range
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Single-shot asynchronous position source
#[allow(async_fn_in_trait)]
pub trait LocationProvider {
    /// Fetch the current position
    async fn locate(&mut self) -> Result<GeoPosition, LocationError>;
}
