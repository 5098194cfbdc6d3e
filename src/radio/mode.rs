use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use super::{Sx1262, CONFIG_TIMEOUT_MS};
use crate::{
    clock::Clock,
    commands::{LoRaPacketParams, RxMode, SetPacketParams, SetRx},
    error::Error,
};

/// Largest payload a variable length LoRa packet can carry
pub(crate) const MAX_PAYLOAD_LEN: u8 = 255;

/// Mode the driver last put the radio in
///
/// There is no transmitting state: a transmit leaves the radio in standby once the chip
/// reports it done, and the driver records standby as soon as the transmit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioMode {
    Standby,
    Receiving,
}

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Puts the radio in continuous receive mode
    ///
    /// Does nothing, and sends nothing, when the radio is already receiving.
    pub fn set_receive_mode(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        if self.mode == RadioMode::Receiving {
            return Ok(());
        }

        self.command(
            SetPacketParams {
                params: LoRaPacketParams::variable_length(MAX_PAYLOAD_LEN),
            },
            CONFIG_TIMEOUT_MS,
        )?;
        self.command(
            SetRx {
                mode: RxMode::Continuous,
            },
            CONFIG_TIMEOUT_MS,
        )?;

        self.mode = RadioMode::Receiving;
        log::debug!("receiving");
        Ok(())
    }
}
