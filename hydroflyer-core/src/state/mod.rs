//! Maneuver state machine
//!
//! Derives the discrete maneuver the vehicle is being asked to perform
//! from the two tilt bytes of the control command.

pub mod maneuver;

pub use maneuver::{next_state, ManeuverState, ManeuverStateMachine, Transition};
