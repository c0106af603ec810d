//! Configuration types
//!
//! Board-agnostic dashboard configuration, read from a small TOML file.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
