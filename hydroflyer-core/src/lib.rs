//! Board-agnostic core logic for the Hydroflyer handheld dashboard
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (tilt sensor, vehicle transport, location provider)
//! - Tilt-to-command encoding
//! - Maneuver state machine
//! - Exchange cycle (command out, telemetry back) with link statistics
//! - Own-position refresh cycle
//! - Consumer-facing snapshot and status indicators
//! - Configuration types and parsing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod dashboard;
pub mod exchange;
pub mod position;
pub mod state;
pub mod tilt;
pub mod traits;
