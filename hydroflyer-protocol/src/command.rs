//! Control command encoding
//!
//! A control command is a fixed 6-byte array. Bytes 0 and 1 carry the
//! tilt-derived steering intent; bytes 2-5 are reserved and always
//! transmitted as zero.
//!
//! Wire form (query string):
//! - `a=<byte0>&b=<byte1>&c=<byte2>&d=<byte3>&e=<byte4>&f=<byte5>`
//! - each value is the plain decimal rendering of the byte

use core::fmt::Write;

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of bytes in a control command
pub const COMMAND_LEN: usize = 6;

/// Query parameter names, in byte order
pub const QUERY_KEYS: [char; COMMAND_LEN] = ['a', 'b', 'c', 'd', 'e', 'f'];

/// Neutral ("level") value for the tilt bytes
pub const NEUTRAL: u8 = 100;

/// Maximum encoded query length (`x=255` six times plus five `&`)
pub const MAX_QUERY_LEN: usize = COMMAND_LEN * 5 + (COMMAND_LEN - 1);

/// Maximum request target length (`<path>?<query>`)
pub const MAX_TARGET_LEN: usize = 96;

/// Errors that can occur while building a request target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Endpoint path does not fit in the target buffer
    PathTooLong,
}

/// Six-byte control command sent to the vehicle on every exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlCommand {
    bytes: [u8; COMMAND_LEN],
}

impl Default for ControlCommand {
    fn default() -> Self {
        Self::neutral()
    }
}

impl ControlCommand {
    /// Create a command from raw bytes
    pub const fn new(bytes: [u8; COMMAND_LEN]) -> Self {
        Self { bytes }
    }

    /// Level handheld: both tilt bytes neutral, reserved bytes zero
    pub const fn neutral() -> Self {
        Self::from_tilt(NEUTRAL, NEUTRAL)
    }

    /// Create a command from the two tilt bytes, reserved bytes zero-filled
    pub const fn from_tilt(tilt_x: u8, tilt_y: u8) -> Self {
        Self {
            bytes: [tilt_x, tilt_y, 0, 0, 0, 0],
        }
    }

    /// Tilt-X byte (`a`)
    pub const fn tilt_x(&self) -> u8 {
        self.bytes[0]
    }

    /// Tilt-Y byte (`b`)
    pub const fn tilt_y(&self) -> u8 {
        self.bytes[1]
    }

    /// Reserved bytes (`c`..`f`)
    pub fn reserved(&self) -> &[u8] {
        &self.bytes[2..]
    }

    /// All six bytes in wire order
    pub const fn as_bytes(&self) -> &[u8; COMMAND_LEN] {
        &self.bytes
    }

    /// Encode the query string for this command
    ///
    /// Never fails: the buffer is sized for the widest possible command.
    pub fn encode_query(&self) -> String<MAX_QUERY_LEN> {
        let mut query = String::new();
        for (i, (key, value)) in QUERY_KEYS.iter().zip(self.bytes.iter()).enumerate() {
            if i > 0 {
                let _ = query.push('&');
            }
            let _ = write!(query, "{}={}", key, value);
        }
        query
    }

    /// Build the full request target `<path>?<query>`
    pub fn request_target(&self, path: &str) -> Result<String<MAX_TARGET_LEN>, EncodeError> {
        let mut target = String::new();
        target
            .push_str(path)
            .map_err(|_| EncodeError::PathTooLong)?;
        target.push('?').map_err(|_| EncodeError::PathTooLong)?;
        target
            .push_str(&self.encode_query())
            .map_err(|_| EncodeError::PathTooLong)?;
        Ok(target)
    }
}

impl From<[u8; COMMAND_LEN]> for ControlCommand {
    fn from(bytes: [u8; COMMAND_LEN]) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_query() {
        let cmd = ControlCommand::new([105, 100, 0, 0, 0, 0]);
        assert_eq!(cmd.encode_query().as_str(), "a=105&b=100&c=0&d=0&e=0&f=0");
    }

    #[test]
    fn test_request_target() {
        let cmd = ControlCommand::from_tilt(105, 100);
        let target = cmd.request_target("/Maneuver").unwrap();
        assert_eq!(target.as_str(), "/Maneuver?a=105&b=100&c=0&d=0&e=0&f=0");
    }

    #[test]
    fn test_widest_command_fits() {
        let cmd = ControlCommand::new([255; COMMAND_LEN]);
        let query = cmd.encode_query();
        assert_eq!(query.as_str(), "a=255&b=255&c=255&d=255&e=255&f=255");
        assert_eq!(query.len(), MAX_QUERY_LEN);
    }

    #[test]
    fn test_path_too_long() {
        let path = [b'x'; MAX_TARGET_LEN];
        let path = core::str::from_utf8(&path).unwrap();
        let result = ControlCommand::neutral().request_target(path);
        assert_eq!(result, Err(EncodeError::PathTooLong));
    }

    #[test]
    fn test_default_is_neutral_with_zero_reserved() {
        let cmd = ControlCommand::default();
        assert_eq!(cmd.tilt_x(), NEUTRAL);
        assert_eq!(cmd.tilt_y(), NEUTRAL);
        assert!(cmd.reserved().iter().all(|&b| b == 0));
    }

    proptest! {
        #[test]
        fn query_lists_every_byte(bytes in proptest::array::uniform6(any::<u8>())) {
            let query = ControlCommand::new(bytes).encode_query();
            let mut parts = query.split('&');
            for (key, value) in QUERY_KEYS.iter().zip(bytes.iter()) {
                let part = parts.next().unwrap();
                let (k, v) = part.split_once('=').unwrap();
                prop_assert_eq!(k.chars().next(), Some(*key));
                prop_assert_eq!(v.parse::<u8>().unwrap(), *value);
            }
            prop_assert!(parts.next().is_none());
        }
    }
}
