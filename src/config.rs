//! LoRa modulation and frequency configuration
//!
//! [`RadioConfig`] is the single source of truth for what the radio was last told. It is
//! replaced wholesale: every `with_*` method validates its argument and hands back a new
//! value, leaving the original untouched on rejection.
//!
//! Raw setting codes follow datasheet section 13.4.5.2.

use core::fmt;

use crate::commands::{frequency_to_register, LoRaModulationParams};

/// Lowest RF frequency the SX1262 synthesizer supports, in Hz
pub const MIN_FREQUENCY_HZ: u32 = 150_000_000;
/// Highest RF frequency the SX1262 synthesizer supports, in Hz
pub const MAX_FREQUENCY_HZ: u32 = 960_000_000;
/// Frequency programmed by [`Sx1262::init`](crate::Sx1262::init)
pub const DEFAULT_FREQUENCY_HZ: u32 = 915_000_000;

/// A configuration argument that was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidConfig {
    /// Frequency outside 150-960 MHz
    Frequency(u32),
    /// Not a LoRa bandwidth code (0x07 and anything above 0x0A)
    Bandwidth(u8),
    /// Coding rate outside 1..=4
    CodingRate(u8),
    /// Spreading factor outside 5..=12
    SpreadingFactor(u8),
    /// Unknown preset number
    Preset(u8),
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frequency(hz) => write!(f, "frequency {hz} Hz outside 150-960 MHz"),
            Self::Bandwidth(code) => write!(f, "bandwidth code {code:#04x}"),
            Self::CodingRate(cr) => write!(f, "coding rate {cr}"),
            Self::SpreadingFactor(sf) => write!(f, "spreading factor {sf}"),
            Self::Preset(preset) => write!(f, "preset {preset}"),
        }
    }
}

/// LoRa signal bandwidth
///
/// The discriminant is the raw ModParam2 code. Codes are not ordered by width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bandwidth {
    /// 7.81 kHz
    Khz7_81 = 0x00,
    /// 10.42 kHz
    Khz10_42 = 0x08,
    /// 15.63 kHz
    Khz15_63 = 0x01,
    /// 20.83 kHz
    Khz20_83 = 0x09,
    /// 31.25 kHz
    Khz31_25 = 0x02,
    /// 41.67 kHz
    Khz41_67 = 0x0A,
    /// 62.50 kHz
    Khz62_5 = 0x03,
    /// 125 kHz
    Khz125 = 0x04,
    /// 250 kHz
    Khz250 = 0x05,
    /// 500 kHz
    Khz500 = 0x06,
}

impl TryFrom<u8> for Bandwidth {
    type Error = InvalidConfig;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x00 => Ok(Self::Khz7_81),
            0x08 => Ok(Self::Khz10_42),
            0x01 => Ok(Self::Khz15_63),
            0x09 => Ok(Self::Khz20_83),
            0x02 => Ok(Self::Khz31_25),
            0x0A => Ok(Self::Khz41_67),
            0x03 => Ok(Self::Khz62_5),
            0x04 => Ok(Self::Khz125),
            0x05 => Ok(Self::Khz250),
            0x06 => Ok(Self::Khz500),
            invalid => Err(InvalidConfig::Bandwidth(invalid)),
        }
    }
}

/// Forward error correction overhead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodingRate {
    /// 4/5 (recommended)
    Cr4_5 = 0x01,
    /// 4/6
    Cr4_6 = 0x02,
    /// 4/7
    Cr4_7 = 0x03,
    /// 4/8
    Cr4_8 = 0x04,
}

impl TryFrom<u8> for CodingRate {
    type Error = InvalidConfig;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Cr4_5),
            2 => Ok(Self::Cr4_6),
            3 => Ok(Self::Cr4_7),
            4 => Ok(Self::Cr4_8),
            invalid => Err(InvalidConfig::CodingRate(invalid)),
        }
    }
}

/// LoRa spreading factor, SF5 (fastest) to SF12 (most robust)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpreadingFactor {
    /// SF5
    Sf5 = 5,
    /// SF6
    Sf6 = 6,
    /// SF7
    Sf7 = 7,
    /// SF8
    Sf8 = 8,
    /// SF9
    Sf9 = 9,
    /// SF10
    Sf10 = 10,
    /// SF11
    Sf11 = 11,
    /// SF12
    Sf12 = 12,
}

impl SpreadingFactor {
    /// Whether the chip requires low data rate optimization at this spreading factor
    pub fn needs_low_data_rate_optimize(self) -> bool {
        self >= Self::Sf11
    }

    /// Host-side budget for a 255 byte transmission to finish, in milliseconds
    ///
    /// Roughly twice the measured time on air at 125 kHz.
    pub fn transmit_timeout_ms(self) -> u32 {
        match self {
            Self::Sf12 => 252_000,
            Self::Sf11 => 160_000,
            Self::Sf10 => 60_000,
            Self::Sf9 => 40_000,
            Self::Sf8 => 20_000,
            Self::Sf7 => 12_000,
            Self::Sf6 => 7_000,
            Self::Sf5 => 5_000,
        }
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = InvalidConfig;

    fn try_from(sf: u8) -> Result<Self, Self::Error> {
        match sf {
            5 => Ok(Self::Sf5),
            6 => Ok(Self::Sf6),
            7 => Ok(Self::Sf7),
            8 => Ok(Self::Sf8),
            9 => Ok(Self::Sf9),
            10 => Ok(Self::Sf10),
            11 => Ok(Self::Sf11),
            12 => Ok(Self::Sf12),
            invalid => Err(InvalidConfig::SpreadingFactor(invalid)),
        }
    }
}

/// Ready-made modulation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    /// Medium range, medium speed: BW 250 kHz, CR 4/5, SF7
    Default,
    /// Slow but most reliable: BW 125 kHz, CR 4/5, SF12
    LongRange,
    /// Fast, for radios close together: BW 500 kHz, CR 4/5, SF5
    Fast,
}

impl Preset {
    fn modulation(self) -> (Bandwidth, CodingRate, SpreadingFactor) {
        match self {
            Self::Default => (Bandwidth::Khz250, CodingRate::Cr4_5, SpreadingFactor::Sf7),
            Self::LongRange => (Bandwidth::Khz125, CodingRate::Cr4_5, SpreadingFactor::Sf12),
            Self::Fast => (Bandwidth::Khz500, CodingRate::Cr4_5, SpreadingFactor::Sf5),
        }
    }
}

impl TryFrom<u8> for Preset {
    type Error = InvalidConfig;

    fn try_from(preset: u8) -> Result<Self, Self::Error> {
        match preset {
            0 => Ok(Self::Default),
            1 => Ok(Self::LongRange),
            2 => Ok(Self::Fast),
            invalid => Err(InvalidConfig::Preset(invalid)),
        }
    }
}

/// Frequency and modulation settings last pushed to the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfig {
    frequency_hz: u32,
    pll_frequency: u32,
    bandwidth: Bandwidth,
    coding_rate: CodingRate,
    spreading_factor: SpreadingFactor,
    low_data_rate_optimize: bool,
    transmit_timeout_ms: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        let (bandwidth, coding_rate, spreading_factor) = Preset::Default.modulation();
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            pll_frequency: frequency_to_register(DEFAULT_FREQUENCY_HZ),
            bandwidth,
            coding_rate,
            spreading_factor,
            low_data_rate_optimize: spreading_factor.needs_low_data_rate_optimize(),
            transmit_timeout_ms: spreading_factor.transmit_timeout_ms(),
        }
    }
}

impl RadioConfig {
    /// Returns a copy tuned to `hz`
    pub fn with_frequency(self, hz: u32) -> Result<Self, InvalidConfig> {
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&hz) {
            return Err(InvalidConfig::Frequency(hz));
        }
        Ok(Self {
            frequency_hz: hz,
            pll_frequency: frequency_to_register(hz),
            ..self
        })
    }

    /// Returns a copy using the bandwidth with raw code `code`
    pub fn with_bandwidth(self, code: u8) -> Result<Self, InvalidConfig> {
        Ok(Self {
            bandwidth: Bandwidth::try_from(code)?,
            ..self
        })
    }

    /// Returns a copy using coding rate 4/(4+`cr`)
    pub fn with_coding_rate(self, cr: u8) -> Result<Self, InvalidConfig> {
        Ok(Self {
            coding_rate: CodingRate::try_from(cr)?,
            ..self
        })
    }

    /// Returns a copy using spreading factor `sf`
    ///
    /// Low data rate optimization and the transmit budget follow the spreading factor.
    pub fn with_spreading_factor(self, sf: u8) -> Result<Self, InvalidConfig> {
        Ok(self.with_modulation(
            self.bandwidth,
            self.coding_rate,
            SpreadingFactor::try_from(sf)?,
        ))
    }

    /// Returns a copy using the modulation settings of `preset`
    pub fn with_preset(self, preset: Preset) -> Self {
        let (bandwidth, coding_rate, spreading_factor) = preset.modulation();
        self.with_modulation(bandwidth, coding_rate, spreading_factor)
    }

    fn with_modulation(
        self,
        bandwidth: Bandwidth,
        coding_rate: CodingRate,
        spreading_factor: SpreadingFactor,
    ) -> Self {
        Self {
            bandwidth,
            coding_rate,
            spreading_factor,
            low_data_rate_optimize: spreading_factor.needs_low_data_rate_optimize(),
            transmit_timeout_ms: spreading_factor.transmit_timeout_ms(),
            ..self
        }
    }

    /// RF frequency in Hz
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    /// PLL register value for [`frequency_hz`](Self::frequency_hz)
    pub fn pll_frequency(&self) -> u32 {
        self.pll_frequency
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn coding_rate(&self) -> CodingRate {
        self.coding_rate
    }

    pub fn spreading_factor(&self) -> SpreadingFactor {
        self.spreading_factor
    }

    pub fn low_data_rate_optimize(&self) -> bool {
        self.low_data_rate_optimize
    }

    /// How long a transmission may take before it is reported as timed out
    pub fn transmit_timeout_ms(&self) -> u32 {
        self.transmit_timeout_ms
    }

    /// Parameters for the SetModulationParams command
    pub fn modulation_params(&self) -> LoRaModulationParams {
        LoRaModulationParams {
            spreading_factor: self.spreading_factor,
            bandwidth: self.bandwidth,
            coding_rate: self.coding_rate,
            low_data_rate_optimize: self.low_data_rate_optimize,
        }
    }
}
