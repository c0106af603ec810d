//! Maneuver state definition
//!
//! The maneuver is a pure function of the two tilt bytes. Transitions
//! are reported only when the state actually changes, so consumers that
//! redraw on transitions do no work on ticks where nothing changed.

use hydroflyer_protocol::ControlCommand;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lower edge of the dead-band around neutral (100)
pub const DEAD_BAND_LOW: u8 = 98;

/// Upper edge of the dead-band around neutral (100)
pub const DEAD_BAND_HIGH: u8 = 102;

/// Maneuver states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ManeuverState {
    /// Tilted forward, level sideways
    Forward,
    /// Tilted forward and to the left
    Left,
    /// Tilted forward and to the right
    Right,
    /// Not enough forward tilt to move
    #[default]
    Stopped,
}

impl ManeuverState {
    /// Check if the vehicle is being asked to move
    pub fn is_moving(&self) -> bool {
        !matches!(self, ManeuverState::Stopped)
    }
}

/// Pure transition function: (byte0, byte1, current) -> next
///
/// Rules, in order:
/// - byte0 <= 98: Stopped
/// - byte1 > 102: Left
/// - byte1 < 98: Right
/// - otherwise: Forward
///
/// The target never depends on the current state; suppressing repeated
/// transitions is [`ManeuverStateMachine::update`]'s job.
pub fn next_state(byte0: u8, byte1: u8, _current: ManeuverState) -> ManeuverState {
    if byte0 <= DEAD_BAND_LOW {
        ManeuverState::Stopped
    } else if byte1 > DEAD_BAND_HIGH {
        ManeuverState::Left
    } else if byte1 < DEAD_BAND_LOW {
        ManeuverState::Right
    } else {
        ManeuverState::Forward
    }
}

/// A state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: ManeuverState,
    pub to: ManeuverState,
}

/// Owns the current maneuver state
#[derive(Debug, Clone, Copy, Default)]
pub struct ManeuverStateMachine {
    current: ManeuverState,
}

impl ManeuverStateMachine {
    /// Create a state machine in the initial (Stopped) state
    pub const fn new() -> Self {
        Self {
            current: ManeuverState::Stopped,
        }
    }

    /// Current state
    pub fn current(&self) -> ManeuverState {
        self.current
    }

    /// Feed the command bytes of one tick
    ///
    /// Returns the transition if the state changed, `None` otherwise.
    pub fn update(&mut self, command: &ControlCommand) -> Option<Transition> {
        let next = next_state(command.tilt_x(), command.tilt_y(), self.current);
        if next == self.current {
            return None;
        }

        let transition = Transition {
            from: self.current,
            to: next,
        };
        self.current = next;
        Some(transition)
    }
}
