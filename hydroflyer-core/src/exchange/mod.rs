//! Exchange loop
//!
//! One cycle per control tick: sample tilt, encode a command, exchange it
//! with the vehicle, decode the reply, then feed the command into the
//! maneuver state machine. Cadence is owned by the caller; a cycle only
//! does the work of a single tick.

pub mod cycle;
pub mod stats;

pub use cycle::{CycleReport, Exchanger, LinkError};
pub use stats::LinkStats;
