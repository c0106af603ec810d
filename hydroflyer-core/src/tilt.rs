//! Tilt-to-command encoding
//!
//! Each tilt axis maps onto one command byte centered on 100:
//! `byte = clamp(round(raw * 10) + 100, 0, 255)`.
//!
//! A level handheld sends 100/100. Roughly ±1 g of tilt spans 90-110,
//! which leaves the vehicle a dead-band around 100 and symmetric headroom
//! either side.

use hydroflyer_protocol::{ControlCommand, NEUTRAL};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counts per g of tilt
pub const COUNTS_PER_G: f32 = 10.0;

/// Two-axis tilt sample in g
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TiltSample {
    /// Tilt along X (forward/back)
    pub x: f32,
    /// Tilt along Y (left/right)
    pub y: f32,
}

impl TiltSample {
    /// Create a sample from raw axis readings
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Encode one raw tilt reading into a command byte
///
/// Rounds half away from zero. The sum is computed in `i32` with
/// saturating float conversion, then clamped, so extreme readings saturate
/// at 0/255 instead of wrapping. NaN encodes as neutral.
pub fn encode_axis(raw: f32) -> u8 {
    round_half_away(raw * COUNTS_PER_G)
        .saturating_add(NEUTRAL as i32)
        .clamp(u8::MIN as i32, u8::MAX as i32) as u8
}

/// `f32::round` for `no_std`, saturating at the `i32` range
///
/// Compares the fractional part instead of adding 0.5 first, which would
/// round values just below one half up.
fn round_half_away(value: f32) -> i32 {
    let whole = value as i32;
    let fraction = value - whole as f32;
    if fraction >= 0.5 {
        whole.saturating_add(1)
    } else if fraction <= -0.5 {
        whole.saturating_sub(1)
    } else {
        whole
    }
}

/// Encodes tilt samples into control commands
#[derive(Debug, Clone, Copy, Default)]
pub struct TiltEncoder;

impl TiltEncoder {
    /// Create a new encoder
    pub const fn new() -> Self {
        Self
    }

    /// Encode a sample into bytes 0 and 1 of a command
    ///
    /// Reserved bytes are always zero.
    pub fn encode(&self, sample: TiltSample) -> ControlCommand {
        ControlCommand::from_tilt(encode_axis(sample.x), encode_axis(sample.y))
    }
}
