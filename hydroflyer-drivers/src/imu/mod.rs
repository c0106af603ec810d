//! Inertial sensors

pub mod lis3dh;

pub use lis3dh::{Lis3dh, ADDR_SDO_HIGH, ADDR_SDO_LOW};
