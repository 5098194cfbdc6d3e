use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use super::{mode::MAX_PAYLOAD_LEN, RadioMode, Sx1262, CONFIG_TIMEOUT_MS};
use crate::{
    clock::Clock,
    commands::{LoRaPacketParams, SetPacketParams, SetTx, Timeout},
    error::Error,
};

/// Opcode reported when the buffer write does not settle
const OPCODE_WRITE_BUFFER: u8 = 0x0E;

/// Idle-wait budget after loading the data buffer
const WRITE_BUFFER_TIMEOUT_MS: u32 = 1_000;

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Sends one packet and blocks until the chip reports it sent
    ///
    /// Payloads longer than 255 bytes are cut to 255 without error; the number of bytes
    /// actually sent is returned. The wait is bounded by the configuration's
    /// [`transmit_timeout_ms`](crate::RadioConfig::transmit_timeout_ms).
    ///
    /// The radio leaves receive mode whatever the outcome; call
    /// [`set_receive_mode`](Self::set_receive_mode) or one of the receive methods to
    /// listen again.
    pub fn transmit(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.ensure_ready()?;
        self.mode = RadioMode::Standby;

        let len = data.len().min(usize::from(MAX_PAYLOAD_LEN));
        let payload = &data[..len];
        log::debug!("transmitting {} of {} bytes", len, data.len());

        self.command(
            SetPacketParams {
                params: LoRaPacketParams::variable_length(len as u8),
            },
            CONFIG_TIMEOUT_MS,
        )?;

        self.device.write_buffer(0, payload)?;
        self.await_idle(OPCODE_WRITE_BUFFER, WRITE_BUFFER_TIMEOUT_MS)?;

        let timeout_ms = self.config.transmit_timeout_ms();
        self.command(
            SetTx {
                timeout: Timeout::NONE,
            },
            timeout_ms,
        )?;

        Ok(len)
    }
}
