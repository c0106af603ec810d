//! Collaborator traits
//!
//! These traits define the interface between the dashboard loops and the
//! hardware or network implementations behind them.

pub mod location;
pub mod tilt;
pub mod transport;

pub use location::{GeoPosition, LocationError, LocationProvider};
pub use tilt::{SensorError, TiltSensor};
pub use transport::{Transport, TransportError};
