//! Driver error type
//!
//! Every fallible operation on [`Sx1262`](crate::Sx1262) returns [`Error`]. Bus level
//! failures surface as the `regiface` error produced by the [`Device`](crate::Device)
//! layer; everything above that is specific to the command protocol.

use core::fmt;

pub use regiface::errors::Error as DeviceError;

use crate::config::InvalidConfig;

/// Errors reported by the radio driver
#[derive(Debug)]
pub enum Error {
    /// SPI transfer or chip-select failure
    Bus(DeviceError),
    /// Reset or DIO1 line could not be driven or sampled
    Pin,
    /// The sanity-check register did not hold its reset value
    ///
    /// Usually a wiring problem. The radio refuses further operations until
    /// [`init`](crate::Sx1262::init) succeeds.
    NotConnected {
        /// Value read back from register 0x0740 (expected 0x14)
        found: u8,
    },
    /// `init` has not completed successfully
    Uninitialized,
    /// The chip did not report completion of a command in time
    Timeout {
        /// Opcode of the command that was being waited on
        opcode: u8,
        /// Budget that elapsed, in milliseconds
        waited_ms: u32,
    },
    /// A configuration argument was rejected before anything was sent
    InvalidConfig(InvalidConfig),
}

impl From<DeviceError> for Error {
    fn from(err: DeviceError) -> Self {
        Self::Bus(err)
    }
}

impl From<InvalidConfig> for Error {
    fn from(err: InvalidConfig) -> Self {
        Self::InvalidConfig(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "bus error: {err:?}"),
            Self::Pin => write!(f, "reset or DIO1 line error"),
            Self::NotConnected { found } => {
                write!(f, "radio not responding (sanity register read {found:#04x})")
            }
            Self::Uninitialized => write!(f, "radio is not initialized"),
            Self::Timeout { opcode, waited_ms } => {
                write!(f, "command {opcode:#04x} did not complete within {waited_ms} ms")
            }
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(f, "Bus"),
            Self::Pin => defmt::write!(f, "Pin"),
            Self::NotConnected { found } => defmt::write!(f, "NotConnected({=u8:#x})", found),
            Self::Uninitialized => defmt::write!(f, "Uninitialized"),
            Self::Timeout { opcode, waited_ms } => {
                defmt::write!(f, "Timeout({=u8:#x}, {=u32} ms)", opcode, waited_ms)
            }
            Self::InvalidConfig(err) => defmt::write!(f, "InvalidConfig({})", err),
        }
    }
}
