use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use super::{Sx1262, CONFIG_TIMEOUT_MS};
use crate::{
    clock::Clock,
    commands::{RfFrequency, SetModulationParams, SetRfFrequency},
    config::{Preset, RadioConfig},
    error::Error,
};

/// Configuration setters
///
/// Each setter rejects an invalid argument before anything is sent and leaves the
/// configuration untouched. A valid value is pushed to the chip and only recorded once
/// the chip has processed it.
impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Tunes the radio to `hz`, 150 MHz to 960 MHz
    pub fn set_frequency(&mut self, hz: u32) -> Result<(), Error> {
        self.ensure_ready()?;
        let config = self.config.with_frequency(hz)?;
        self.push_frequency(&config)?;
        self.config = config;
        Ok(())
    }

    /// Sets the bandwidth from its raw code
    ///
    /// Valid codes are 0-6 and 8-10; 7 is not a bandwidth.
    pub fn set_bandwidth(&mut self, code: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let config = self.config.with_bandwidth(code)?;
        self.push_modulation(&config)?;
        self.config = config;
        Ok(())
    }

    /// Sets the coding rate to 4/(4+`cr`), `cr` in 1-4
    pub fn set_coding_rate(&mut self, cr: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let config = self.config.with_coding_rate(cr)?;
        self.push_modulation(&config)?;
        self.config = config;
        Ok(())
    }

    /// Sets the spreading factor, 5-12
    ///
    /// SF11 and SF12 turn on low data rate optimization. The transmit timeout follows the
    /// spreading factor.
    pub fn set_spreading_factor(&mut self, sf: u8) -> Result<(), Error> {
        self.ensure_ready()?;
        let config = self.config.with_spreading_factor(sf)?;
        self.push_modulation(&config)?;
        self.config = config;
        Ok(())
    }

    /// Applies bandwidth, coding rate and spreading factor of `preset` in one push
    pub fn apply_preset(&mut self, preset: Preset) -> Result<(), Error> {
        self.ensure_ready()?;
        let config = self.config.with_preset(preset);
        self.push_modulation(&config)?;
        log::debug!("applied preset {:?}", preset);
        self.config = config;
        Ok(())
    }

    pub(super) fn push_frequency(&mut self, config: &RadioConfig) -> Result<(), Error> {
        log::debug!("frequency {} Hz, pll {}", config.frequency_hz(), config.pll_frequency());
        self.command(
            SetRfFrequency {
                frequency: RfFrequency {
                    pll: config.pll_frequency(),
                },
            },
            CONFIG_TIMEOUT_MS,
        )?;
        Ok(())
    }

    pub(super) fn push_modulation(&mut self, config: &RadioConfig) -> Result<(), Error> {
        log::debug!("modulation {:?}", config.modulation_params());
        self.command(
            SetModulationParams {
                params: config.modulation_params(),
            },
            CONFIG_TIMEOUT_MS,
        )?;
        Ok(())
    }
}
