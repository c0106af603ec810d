//! Own-position refresh
//!
//! The observer's position is refreshed on a slow period, independently of
//! the exchange loop. A failed fetch leaves the last position in place.

pub mod refresh;

pub use refresh::{OwnPosition, PositionRefresher, PositionStats, DEFAULT_POSITION};
