//! NMEA-0183 GNSS receiver
//!
//! The receiver streams sentences over UART, typically once per second.
//! Only position-bearing sentences are interpreted:
//! - `GGA`: fix quality field, `0` = no fix
//! - `RMC`: status field, `A` = valid, `V` = warning
//!
//! Any talker ID is accepted (`GP`, `GN`, `GL`, ...). Sentences with a bad
//! checksum are dropped.

use core::ops::Range;
use core::str;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::watch::Sender;
use embedded_io_async::Read;
use heapless::Vec;
use hydroflyer_core::traits::{GeoPosition, LocationError};

use super::FixReport;

/// Maximum sentence length including `$` and the checksum
pub const MAX_SENTENCE_LEN: usize = 82;

/// UART read size
const CHUNK_LEN: usize = 32;

/// Errors for a single sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NmeaError {
    /// Missing or mismatched `*hh` checksum
    Checksum,
    /// Fields missing or not parseable
    Malformed,
    /// Line longer than [`MAX_SENTENCE_LEN`]
    Overflow,
}

/// Interpretation of one sentence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sentence {
    /// Position with a valid fix
    Fix(GeoPosition),
    /// Position sentence reporting no fix
    NoFix,
    /// Any other sentence type
    Other,
}

/// Check the `*hh` XOR checksum of a `$...*hh` line
pub fn validate_checksum(line: &[u8]) -> bool {
    let Some(body) = line.strip_prefix(b"$") else {
        return false;
    };
    let Some(star) = body.iter().position(|&b| b == b'*') else {
        return false;
    };

    let hex = &body[star + 1..];
    if hex.len() != 2 {
        return false;
    }
    let expected = str::from_utf8(hex)
        .ok()
        .and_then(|s| u8::from_str_radix(s, 16).ok());

    let calc = body[..star].iter().fold(0u8, |acc, &b| acc ^ b);
    expected == Some(calc)
}

/// Parse one complete line (no CR/LF)
pub fn parse_sentence(line: &[u8]) -> Result<Sentence, NmeaError> {
    if !validate_checksum(line) {
        return Err(NmeaError::Checksum);
    }

    // Between '$' and '*'
    let end = line.len() - 3;
    let payload = str::from_utf8(&line[1..end]).map_err(|_| NmeaError::Malformed)?;

    let mut fields = [""; 7];
    for (slot, field) in fields.iter_mut().zip(payload.split(',')) {
        *slot = field;
    }

    let address = fields[0];
    if address.len() != 5 {
        return Ok(Sentence::Other);
    }

    match &address[2..] {
        // GGA: time, lat, N/S, lon, E/W, quality
        "GGA" => {
            if fields[6].is_empty() || fields[6] == "0" {
                return Ok(Sentence::NoFix);
            }
            position(fields[2], fields[3], fields[4], fields[5])
        }
        // RMC: time, status, lat, N/S, lon, E/W
        "RMC" => {
            if fields[2] != "A" {
                return Ok(Sentence::NoFix);
            }
            position(fields[3], fields[4], fields[5], fields[6])
        }
        _ => Ok(Sentence::Other),
    }
}

fn position(lat: &str, ns: &str, lon: &str, ew: &str) -> Result<Sentence, NmeaError> {
    let latitude = parse_coordinate(lat, ns, 'N', 'S', 90.0)?;
    let longitude = parse_coordinate(lon, ew, 'E', 'W', 180.0)?;
    Ok(Sentence::Fix(GeoPosition::new(latitude, longitude)))
}

/// Convert `(d)ddmm.mmmm` plus hemisphere into signed decimal degrees
fn parse_coordinate(
    raw: &str,
    hemisphere: &str,
    positive: char,
    negative: char,
    limit: f64,
) -> Result<f64, NmeaError> {
    let value: f64 = raw.parse().map_err(|_| NmeaError::Malformed)?;
    if !value.is_finite() || value < 0.0 {
        return Err(NmeaError::Malformed);
    }

    let degrees = (value / 100.0) as u32 as f64;
    let minutes = value - degrees * 100.0;
    if minutes >= 60.0 {
        return Err(NmeaError::Malformed);
    }

    let magnitude = degrees + minutes / 60.0;
    if magnitude > limit {
        return Err(NmeaError::Malformed);
    }

    let mut chars = hemisphere.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c == positive => Ok(magnitude),
        (Some(c), None) if c == negative => Ok(-magnitude),
        _ => Err(NmeaError::Malformed),
    }
}

/// Assembles sentences from a byte stream
///
/// Bytes outside a sentence are ignored, so the assembler resynchronises
/// on the next `$` after noise or a dropped chunk.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8, MAX_SENTENCE_LEN>,
    in_sentence: bool,
    overflowed: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            in_sentence: false,
            overflowed: false,
        }
    }

    /// Drop any partial line
    pub fn reset(&mut self) {
        self.buf.clear();
        self.in_sentence = false;
        self.overflowed = false;
    }

    /// Feed one byte; returns the parsed sentence when a line completes
    pub fn push(&mut self, byte: u8) -> Option<Result<Sentence, NmeaError>> {
        match byte {
            b'$' => {
                self.buf.clear();
                self.in_sentence = true;
                self.overflowed = false;
                let _ = self.buf.push(byte);
                None
            }
            b'\r' | b'\n' => {
                if !self.in_sentence {
                    return None;
                }
                self.in_sentence = false;
                if self.overflowed {
                    return Some(Err(NmeaError::Overflow));
                }
                Some(parse_sentence(&self.buf))
            }
            _ if self.in_sentence => {
                if self.buf.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }
}

/// NMEA sentence reader over a UART
///
/// Meant to be driven continuously from its own task so the UART buffer
/// never holds more than a sentence or two; see [`super::LatestFix`].
pub struct NmeaReceiver<R> {
    uart: R,
    lines: LineAssembler,
    chunk: [u8; CHUNK_LEN],
    pending: Range<usize>,
}

impl<R: Read> NmeaReceiver<R> {
    pub fn new(uart: R) -> Self {
        Self {
            uart,
            lines: LineAssembler::new(),
            chunk: [0; CHUNK_LEN],
            pending: 0..0,
        }
    }

    /// Read until the next GGA/RMC sentence
    ///
    /// Returns the fix, or `NoFix` when that sentence reports none. Bytes
    /// after it stay buffered for the next call. A read error or end of
    /// stream drops the partial line and returns `Io`.
    pub async fn next_position(&mut self) -> Result<GeoPosition, LocationError> {
        loop {
            while let Some(i) = self.pending.next() {
                match self.lines.push(self.chunk[i]) {
                    Some(Ok(Sentence::Fix(position))) => return Ok(position),
                    Some(Ok(Sentence::NoFix)) => return Err(LocationError::NoFix),
                    // Other sentences and corrupt lines: keep reading
                    Some(Ok(Sentence::Other)) | Some(Err(_)) | None => {}
                }
            }

            match self.uart.read(&mut self.chunk).await {
                Ok(n) if n > 0 => self.pending = 0..n,
                _ => {
                    self.lines.reset();
                    return Err(LocationError::Io);
                }
            }
        }
    }

    /// Read the next position report and publish it
    ///
    /// `Io` is returned instead of published; the caller decides how long
    /// to back off before reading again.
    pub async fn publish_next<M: RawMutex, const N: usize>(
        &mut self,
        sender: &Sender<'_, M, FixReport, N>,
    ) -> Result<(), LocationError> {
        match self.next_position().await {
            Err(LocationError::Io) => Err(LocationError::Io),
            report => {
                sender.send(report);
                Ok(())
            }
        }
    }
}
