//! Operational mode commands
//!
//! This module contains commands for controlling the radio's operating modes:
//! - Transmit and receive modes and their timeouts
//! - RX timer behaviour on preamble detection
//! - Power amplifier configuration
//!
//! Mode transitions are not instantaneous. The chip keeps reporting its previous mode
//! for a few milliseconds after SetTx/SetRx, which is why completion is always polled
//! after a settle delay.

use bitflags::bitflags;
use core::convert::Infallible;

use crate::{Command, NoParameters, ToByteArray};

/// Timeout configuration for Tx/Rx operations
///
/// 24-bit count of 15.625 μs steps, sent MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout(pub u32);

impl Timeout {
    /// All 24 bits set
    ///
    /// For RX this selects continuous mode. For TX the chip-side timer is
    /// effectively disabled and the host bounds the transmission instead.
    pub const NONE: Self = Self(0x00FF_FFFF);
}

impl ToByteArray for Timeout {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [_, high, mid, low] = self.0.to_be_bytes();
        Ok([high, mid, low])
    }
}

/// SetTx command (0x83)
///
/// Puts the radio into transmit mode, sending whatever the data buffer holds.
///
/// # Important Notes
/// - PA ramps according to SetTxParams ramp time
/// - Returns to standby after TxDone or the timeout
#[derive(Debug, Clone)]
pub struct SetTx {
    /// Timeout in steps of 15.625 μs
    pub timeout: Timeout,
}

impl Command for SetTx {
    type IdType = u8;
    type CommandParameters = Timeout;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x83
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.timeout
    }
}

/// RX operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxMode {
    /// Return after receiving a single packet
    Single,
    /// Continuous reception until another mode is commanded
    Continuous,
    /// Return after timeout or packet reception
    /// Timeout in steps of 15.625 μs (max 262s)
    Timed(u32),
}

impl From<RxMode> for Timeout {
    fn from(mode: RxMode) -> Self {
        match mode {
            RxMode::Single => Timeout(0x000000),
            RxMode::Continuous => Timeout::NONE,
            RxMode::Timed(timeout) => Timeout(timeout & 0x00FF_FFFF),
        }
    }
}

/// SetRx command (0x82)
///
/// Puts the radio into receive mode.
///
/// # Important Notes
/// - In continuous mode the chip stays in RX after each packet
/// - RxDone is raised on DIO1 once the IRQ mask routes it there
#[derive(Debug, Clone)]
pub struct SetRx {
    /// RX operation mode
    pub mode: RxMode,
}

impl Command for SetRx {
    type IdType = u8;
    type CommandParameters = Timeout;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x82
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.mode.into()
    }
}

bitflags! {
    /// StopTimerOnPreamble configuration
    ///
    /// Controls when RX timeout timer is stopped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StopTimerOnPreambleConfig: u8 {
        /// When set, stop timer on preamble detection
        /// When clear, stop on Sync/Header (default)
        const STOP_ON_PREAMBLE = 1;
    }
}

impl ToByteArray for StopTimerOnPreambleConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.bits()])
    }
}

/// StopTimerOnPreamble command (0x9F)
///
/// Configures when RX timeout timer is stopped.
#[derive(Debug, Clone)]
pub struct StopTimerOnPreamble {
    /// Stop on preamble configuration
    pub config: StopTimerOnPreambleConfig,
}

impl Command for StopTimerOnPreamble {
    type IdType = u8;
    type CommandParameters = StopTimerOnPreambleConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x9F
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// Device selection for PA configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSelect {
    /// SX1262 device (+22dBm max)
    Sx1262 = 0,
    /// SX1261 device (+15dBm max)
    Sx1261 = 1,
}

/// PA configuration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaConfig {
    /// PA duty cycle, set together with `hp_max`
    pub duty_cycle: u8,

    /// HP max (SX1262 only), 0x00-0x07 where 0x07 is full power
    pub hp_max: u8,

    /// Device selection
    pub device_sel: DeviceSelect,

    /// PA LUT (always 0x01)
    pub pa_lut: u8,
}

impl PaConfig {
    /// +22 dBm on the SX1262 high power PA
    pub const SX1262_FULL_POWER: Self = Self {
        duty_cycle: 0x04,
        hp_max: 0x07,
        device_sel: DeviceSelect::Sx1262,
        pa_lut: 0x01,
    };
}

impl ToByteArray for PaConfig {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.duty_cycle,
            self.hp_max,
            self.device_sel as u8,
            self.pa_lut,
        ])
    }
}

/// SetPaConfig command (0x95)
///
/// Configures the power amplifier.
///
/// # Important Notes
/// - Must be configured before SetTxParams
/// - SX1262: duty_cycle ≤ 0x04 at all frequencies
#[derive(Debug, Clone)]
pub struct SetPaConfig {
    /// PA configuration
    pub config: PaConfig,
}

impl Command for SetPaConfig {
    type IdType = u8;
    type CommandParameters = PaConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x95
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_24_bits_msb_first() {
        assert_eq!(Timeout::NONE.to_bytes(), Ok([0xFF, 0xFF, 0xFF]));
        assert_eq!(Timeout(0x0012_3456).to_bytes(), Ok([0x12, 0x34, 0x56]));
        assert_eq!(Timeout::from(RxMode::Continuous), Timeout::NONE);
        assert_eq!(Timeout::from(RxMode::Timed(0x0100_0001)), Timeout(1));
    }

    #[test]
    fn full_power_pa_config() {
        assert_eq!(
            PaConfig::SX1262_FULL_POWER.to_bytes(),
            Ok([0x04, 0x07, 0x00, 0x01])
        );
    }
}
