//! Register definitions for the SX126x radio
//!
//! Only the registers the driver actually reads are described here. Registers are
//! accessed through [`Device::read_register`](crate::Device::read_register).

mod packet;

pub use packet::*;
