//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in hydroflyer-core:
//!
//! - Tilt sensor: LIS3DH accelerometer over I2C
//! - Location provider: NMEA-0183 GNSS receiver over UART, read
//!   continuously, newest report served through a watch

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gnss;
pub mod imu;
