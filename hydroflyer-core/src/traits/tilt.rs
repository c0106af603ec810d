//! Tilt sensor trait

use crate::tilt::TiltSample;

/// Errors that can occur while sampling tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Bus transaction failed
    Bus,
    /// Device did not identify as the expected part
    WrongDevice,
    /// No new sample available yet
    NotReady,
}

/// Trait for two-axis tilt sensors
///
/// Implementations return tilt in g (roughly [-1.0, 1.0] per axis when the
/// handheld is held still). Sampling is on demand: one call, one reading.
#[allow(async_fn_in_trait)]
pub trait TiltSensor {
    /// Take one sample
    async fn sample(&mut self) -> Result<TiltSample, SensorError>;
}
