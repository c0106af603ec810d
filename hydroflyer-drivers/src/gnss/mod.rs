//! GNSS receivers

pub mod latest;
pub mod nmea;

pub use latest::{FixReport, LatestFix};
pub use nmea::{NmeaError, NmeaReceiver, Sentence, MAX_SENTENCE_LEN};
