//! Hydroflyer Handheld <-> Vehicle Protocol
//!
//! This crate defines the polling protocol between the handheld dashboard
//! and the Hydroflyer vehicle. The vehicle runs a tiny HTTP server on its
//! Wi-Fi access point; the handheld issues one request per exchange and
//! the vehicle answers with a telemetry line.
//!
//! # Protocol Overview
//!
//! Request (handheld → vehicle), one per exchange:
//! ```text
//! GET /Maneuver?a=105&b=100&c=0&d=0&e=0&f=0 HTTP/1.1
//! ```
//! Six query parameters carry the six command bytes as decimal strings.
//! Only `a` (tilt-X) and `b` (tilt-Y) are populated; `c`..`f` are reserved.
//!
//! Response (vehicle → handheld), plain text body:
//! ```text
//! ┌──────────┬──────────┬───────────┬─────────┬──────────┬────────────────┐
//! │ VALIDITY │ LATITUDE │ LONGITUDE │ HEADING │ LEAK RAW │ FLOAT SW. RAW  │
//! └──────────┴──────────┴───────────┴─────────┴──────────┴────────────────┘
//!   31|21.201395|72.788782|187|40|600
//! ```
//!
//! The link is lossy by nature: every exchange is independent and a failed
//! exchange is simply retried on the next tick.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod http;
pub mod telemetry;

pub use command::{ControlCommand, EncodeError, COMMAND_LEN, NEUTRAL};
pub use http::{get_request, parse_response, response_complete, HttpError, MAX_REQUEST_LEN};
pub use telemetry::{
    Decoded, Field, FieldFailures, TelemetryError, TelemetryRecord, FIELD_COUNT,
    FIELD_DELIMITER, GPS_VALID_CODE,
};
