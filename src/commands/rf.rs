//! RF, modulation and packet commands
//!
//! This module contains commands for configuring RF parameters, modulation settings,
//! and packet handling. These commands control:
//! - RF frequency configuration
//! - Packet type selection
//! - TX power and ramping
//! - LoRa modulation parameters
//! - LoRa packet formatting
//!
//! Most configuration commands must be issued while in STDBY_RC mode.

use core::convert::Infallible;

use crate::config::{Bandwidth, CodingRate, SpreadingFactor};
use crate::{Command, NoParameters, ToByteArray};

/// Crystal frequency the PLL is referenced to
const XTAL_FREQUENCY_HZ: u32 = 32_000_000;
/// 2^25 / 32 MHz reduced to lowest terms: 16384 / 15625
const PLL_STEP_NUMERATOR: u32 = 16_384;
const PLL_STEP_DENOMINATOR: u32 = XTAL_FREQUENCY_HZ / 2_048;

/// Converts an RF frequency in Hz into the SX1262 PLL register value
///
/// Computes `floor(hz * 2^25 / 32 MHz)` in 32-bit integer arithmetic without overflow
/// by splitting `hz` into a quotient and remainder of the reduced step denominator.
/// The result matches the chip's own rounding, e.g. 915 MHz gives `959_447_040`.
///
/// Only meaningful for 150-960 MHz; range checking is left to the caller.
pub const fn frequency_to_register(hz: u32) -> u32 {
    let quotient = (hz / PLL_STEP_DENOMINATOR) * PLL_STEP_NUMERATOR;
    let remainder = (hz % PLL_STEP_DENOMINATOR) * PLL_STEP_NUMERATOR;
    quotient + remainder / PLL_STEP_DENOMINATOR
}

/// RF frequency configuration parameters
///
/// Holds the PLL register value, not a frequency in Hz. Use
/// [`RfFrequency::from_hz`] to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfFrequency {
    /// PLL steps: RF = pll * 32 MHz / 2^25
    pub pll: u32,
}

impl RfFrequency {
    /// Converts `hz` (150-960 MHz) with [`frequency_to_register`]
    pub const fn from_hz(hz: u32) -> Self {
        Self {
            pll: frequency_to_register(hz),
        }
    }
}

impl ToByteArray for RfFrequency {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.pll.to_be_bytes())
    }
}

/// SetRfFrequency command (0x86)
///
/// Sets the RF frequency for both TX and RX operations.
///
/// # Important Notes
/// - Register value is sent MSB first
/// - The frequency resolution (PLL step) is ~0.95Hz
#[derive(Debug, Clone)]
pub struct SetRfFrequency {
    /// RF frequency configuration
    pub frequency: RfFrequency,
}

impl Command for SetRfFrequency {
    type IdType = u8;
    type CommandParameters = RfFrequency;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x86
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.frequency
    }
}

/// Packet type options for radio configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// GFSK packet type (0x00)
    Gfsk = 0x00,

    /// LoRa packet type (0x01)
    /// Supports spreading factors 5-12 and bandwidths 7.8-500kHz
    LoRa = 0x01,
}

impl ToByteArray for PacketType {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self as u8])
    }
}

/// SetPacketType command (0x8A)
///
/// Sets the packet type (LoRa or GFSK) and associated modem configuration.
///
/// # Important Notes
/// - Must be called while in STDBY_RC mode
/// - Modulation and packet parameters must be reconfigured after changing type
#[derive(Debug, Clone)]
pub struct SetPacketType {
    /// Packet type selection
    pub packet_type: PacketType,
}

impl Command for SetPacketType {
    type IdType = u8;
    type CommandParameters = PacketType;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x8A
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.packet_type
    }
}

/// Power amplifier ramp time options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampTime {
    /// 10 μs ramp time
    Micros10 = 0x00,
    /// 20 μs ramp time
    Micros20 = 0x01,
    /// 40 μs ramp time
    Micros40 = 0x02,
    /// 80 μs ramp time
    Micros80 = 0x03,
    /// 200 μs ramp time
    Micros200 = 0x04,
    /// 800 μs ramp time
    Micros800 = 0x05,
    /// 1700 μs ramp time
    Micros1700 = 0x06,
    /// 3400 μs ramp time
    Micros3400 = 0x07,
}

/// TX parameters configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    /// Output power in dBm, -9 to +22 on the SX1262 high power PA
    pub power: i8,

    /// Power amplifier ramp time
    pub ramp_time: RampTime,
}

impl ToByteArray for TxParams {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.power as u8, self.ramp_time as u8])
    }
}

/// SetTxParams command (0x8E)
///
/// Sets the TX output power and PA ramp time.
///
/// # Important Notes
/// - Power range depends on PA configuration
/// - Must be configured after SetPaConfig
#[derive(Debug, Clone)]
pub struct SetTxParams {
    /// TX parameters configuration
    pub params: TxParams,
}

impl Command for SetTxParams {
    type IdType = u8;
    type CommandParameters = TxParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x8E
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

/// LoRa modulation parameters
///
/// Serialized as SF, BW, CR, LDRO in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoRaModulationParams {
    /// Spreading factor (ModParam1)
    pub spreading_factor: SpreadingFactor,
    /// Bandwidth (ModParam2)
    pub bandwidth: Bandwidth,
    /// Coding rate (ModParam3)
    pub coding_rate: CodingRate,
    /// Low data rate optimization (ModParam4), required for SF11 and SF12
    pub low_data_rate_optimize: bool,
}

impl ToByteArray for LoRaModulationParams {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.spreading_factor as u8,
            self.bandwidth as u8,
            self.coding_rate as u8,
            self.low_data_rate_optimize as u8,
        ])
    }
}

/// SetModulationParams command (0x8B)
///
/// Configures the LoRa modulation parameters.
///
/// # Important Notes
/// - Must be called after SetPacketType
/// - The radio does not work at all until this has been sent once
/// - All four parameters are always sent together
#[derive(Debug, Clone)]
pub struct SetModulationParams {
    /// Modulation parameters
    pub params: LoRaModulationParams,
}

impl Command for SetModulationParams {
    type IdType = u8;
    type CommandParameters = LoRaModulationParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x8B
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

/// LoRa header mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderType {
    /// Explicit header carrying the payload length
    Variable = 0x00,
    /// Implicit header, both ends agree on the payload length
    Fixed = 0x01,
}

/// LoRa packet parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoRaPacketParams {
    /// Preamble length in symbols
    pub preamble_len: u16,
    /// Header mode
    pub header_type: HeaderType,
    /// Payload length in bytes (maximum in RX with a variable header)
    pub payload_len: u8,
    /// Payload CRC enable
    pub crc_on: bool,
    /// IQ inversion enable
    pub invert_iq: bool,
}

impl LoRaPacketParams {
    /// Preamble of 12 symbols, explicit header, no CRC, standard IQ
    pub const fn variable_length(payload_len: u8) -> Self {
        Self {
            preamble_len: 12,
            header_type: HeaderType::Variable,
            payload_len,
            crc_on: false,
            invert_iq: false,
        }
    }
}

impl ToByteArray for LoRaPacketParams {
    type Error = Infallible;
    type Array = [u8; 6];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [preamble_msb, preamble_lsb] = self.preamble_len.to_be_bytes();
        Ok([
            preamble_msb,
            preamble_lsb,
            self.header_type as u8,
            self.payload_len,
            self.crc_on as u8,
            self.invert_iq as u8,
        ])
    }
}

/// SetPacketParams command (0x8C)
///
/// Configures the LoRa packet format.
///
/// # Important Notes
/// - In TX the payload length is the size of the packet about to be sent
/// - In RX with a variable header it is the largest packet accepted
/// - Must be called after SetModulationParams
#[derive(Debug, Clone)]
pub struct SetPacketParams {
    /// Packet parameters
    pub params: LoRaPacketParams,
}

impl Command for SetPacketParams {
    type IdType = u8;
    type CommandParameters = LoRaPacketParams;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x8C
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

/// LoRa symbol number timeout configuration
#[derive(Debug, Clone, Copy)]
pub struct LoRaSymbNumTimeout {
    /// Number of symbols to validate reception
    /// 0 = Validate on first symbol
    pub symb_num: u8,
}

impl ToByteArray for LoRaSymbNumTimeout {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.symb_num])
    }
}

/// SetLoRaSymbNumTimeout command (0xA0)
///
/// Sets the number of symbols to wait for valid LoRa reception.
#[derive(Debug, Clone)]
pub struct SetLoRaSymbNumTimeout {
    /// LoRa symbol timeout configuration
    pub config: LoRaSymbNumTimeout,
}

impl Command for SetLoRaSymbNumTimeout {
    type IdType = u8;
    type CommandParameters = LoRaSymbNumTimeout;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0xA0
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasheet_example_915_mhz() {
        assert_eq!(frequency_to_register(915_000_000), 959_447_040);
        assert_eq!(
            RfFrequency::from_hz(915_000_000).to_bytes(),
            Ok([0x39, 0x30, 0x00, 0x00])
        );
    }

    #[test]
    fn conversion_is_exact_floor_across_band() {
        let mut hz = 150_000_000u32;
        while hz <= 960_000_000 {
            let register = frequency_to_register(hz) as u64;
            // register = floor(hz * 2^25 / 32e6)  <=>  0 <= hz * 2^25 - register * 32e6 < 32e6
            let scaled = (hz as u64) << 25;
            let back = register * XTAL_FREQUENCY_HZ as u64;
            assert!(back <= scaled, "{hz} Hz rounds up");
            assert!(scaled - back < XTAL_FREQUENCY_HZ as u64, "{hz} Hz off by a step");
            hz += 997_331;
        }
        assert_eq!(frequency_to_register(960_000_000), 1_006_632_960);
        assert_eq!(frequency_to_register(150_000_000), 157_286_400);
    }

    #[test]
    fn packet_params_layout() {
        let params = LoRaPacketParams::variable_length(255);
        assert_eq!(params.to_bytes(), Ok([0x00, 0x0C, 0x00, 0xFF, 0x00, 0x00]));
    }

    #[test]
    fn modulation_params_layout() {
        let params = LoRaModulationParams {
            spreading_factor: SpreadingFactor::Sf12,
            bandwidth: Bandwidth::Khz125,
            coding_rate: CodingRate::Cr4_5,
            low_data_rate_optimize: true,
        };
        assert_eq!(params.to_bytes(), Ok([12, 0x04, 0x01, 0x01]));
    }
}
