//! Telemetry decoding
//!
//! The vehicle answers every exchange with six `|`-delimited fields:
//! - VALIDITY: GPS validity code (31 = fix valid)
//! - LATITUDE / LONGITUDE: decimal degrees
//! - HEADING: compass heading in whole degrees
//! - LEAK RAW / FLOAT SWITCH RAW: analog readings (10-bit ADC on the vehicle)
//!
//! Decoding is best-effort. A reply with fewer than six fields is rejected
//! as a whole, but inside a well-formed reply each field stands alone: a
//! field that fails to parse keeps its previous value and the rest of the
//! record still updates.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Field separator in the telemetry line
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in a telemetry line
pub const FIELD_COUNT: usize = 6;

/// Validity code reported by the vehicle when its GPS has a fix
pub const GPS_VALID_CODE: u8 = 31;

/// Lower bound (exclusive) of the "wet" band for leak/float sensors
pub const WET_RAW_LOW: u32 = 100;

/// Upper bound (exclusive) of the "wet" band for leak/float sensors
pub const WET_RAW_HIGH: u32 = 750;

/// Errors that reject a telemetry reply as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Reply has fewer than [`FIELD_COUNT`] fields
    MalformedTelemetry {
        /// Number of fields actually found
        fields: u8,
    },
}

/// Telemetry fields in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Validity,
    Latitude,
    Longitude,
    Heading,
    LeakRaw,
    FloatSwitchRaw,
}

impl Field {
    /// All fields in wire order
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Validity,
        Field::Latitude,
        Field::Longitude,
        Field::Heading,
        Field::LeakRaw,
        Field::FloatSwitchRaw,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of fields that failed to parse in one reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldFailures(u8);

impl FieldFailures {
    /// No failed fields
    pub const fn none() -> Self {
        Self(0)
    }

    /// Mark a field as failed
    pub fn insert(&mut self, field: Field) {
        self.0 |= field.bit();
    }

    /// Check whether a field failed
    pub const fn contains(&self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    /// True when every field parsed
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of failed fields
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bitmask (bit n = field n in wire order)
    pub const fn bits(&self) -> u8 {
        self.0
    }
}

/// Decoded vehicle state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetryRecord {
    /// Raw GPS validity code (31 = fix valid)
    pub gps_validity_code: u8,
    /// Vehicle latitude, meaningful only with a valid fix
    pub latitude: f64,
    /// Vehicle longitude, meaningful only with a valid fix
    pub longitude: f64,
    /// Compass heading in degrees [0, 360)
    pub heading: u32,
    /// Raw leak detector reading
    pub leak_raw: u32,
    /// Raw float switch reading
    pub float_switch_raw: u32,
    /// True iff the most recent exchange completed and parsed
    pub link_ok: bool,
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a successful decode
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded {
    /// Updated record, `link_ok` set
    pub record: TelemetryRecord,
    /// Fields that kept their previous value
    pub failures: FieldFailures,
}

impl TelemetryRecord {
    /// Record before any exchange: zeroed, link down
    pub const fn new() -> Self {
        Self {
            gps_validity_code: 0,
            latitude: 0.0,
            longitude: 0.0,
            heading: 0,
            leak_raw: 0,
            float_switch_raw: 0,
            link_ok: false,
        }
    }

    /// Decode a telemetry line on top of this record
    ///
    /// Returns a new record; `self` is never modified. On
    /// [`TelemetryError::MalformedTelemetry`] the caller keeps the previous
    /// record (see [`TelemetryRecord::with_link_lost`]).
    pub fn decode(&self, payload: &str) -> Result<Decoded, TelemetryError> {
        let mut fields = [""; FIELD_COUNT];
        let mut count = 0usize;
        for (slot, raw) in fields.iter_mut().zip(payload.split(FIELD_DELIMITER)) {
            *slot = raw.trim();
            count += 1;
        }

        if count < FIELD_COUNT {
            return Err(TelemetryError::MalformedTelemetry { fields: count as u8 });
        }

        let mut record = *self;
        let mut failures = FieldFailures::none();

        for (field, raw) in Field::ALL.iter().zip(fields.iter()) {
            let parsed = match field {
                Field::Validity => raw.parse().ok().map(|v| record.gps_validity_code = v),
                Field::Latitude => parse_degrees(raw, 90.0).map(|v| record.latitude = v),
                Field::Longitude => parse_degrees(raw, 180.0).map(|v| record.longitude = v),
                Field::Heading => parse_heading(raw).map(|v| record.heading = v),
                Field::LeakRaw => raw.parse().ok().map(|v| record.leak_raw = v),
                Field::FloatSwitchRaw => raw.parse().ok().map(|v| record.float_switch_raw = v),
            };
            if parsed.is_none() {
                failures.insert(*field);
            }
        }

        record.link_ok = true;
        Ok(Decoded { record, failures })
    }

    /// Same record with the link marked down, all values retained
    pub const fn with_link_lost(&self) -> Self {
        let mut record = *self;
        record.link_ok = false;
        record
    }

    /// Check if the vehicle reports a valid GPS fix
    pub const fn gps_fix_valid(&self) -> bool {
        self.gps_validity_code == GPS_VALID_CODE
    }

    /// Check if the leak detector reads wet
    pub const fn leak_detected(&self) -> bool {
        in_wet_band(self.leak_raw)
    }

    /// Check if the float switch reports the hull on water
    pub const fn on_water(&self) -> bool {
        in_wet_band(self.float_switch_raw)
    }
}

const fn in_wet_band(raw: u32) -> bool {
    raw > WET_RAW_LOW && raw < WET_RAW_HIGH
}

/// Parse signed decimal degrees, rejecting non-finite or out-of-range values
fn parse_degrees(raw: &str, limit: f64) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    if value.is_finite() && value >= -limit && value <= limit {
        Some(value)
    } else {
        None
    }
}

/// Parse a compass heading, rejecting values outside [0, 360)
fn parse_heading(raw: &str) -> Option<u32> {
    let value: u32 = raw.parse().ok()?;
    (value < 360).then_some(value)
}
