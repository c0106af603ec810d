//! Configuration loading
//!
//! The dashboard configuration is embedded at build time from
//! `dashboard.toml` (validated by build.rs) and parsed on boot.

pub mod loader;

pub use loader::load_config;
