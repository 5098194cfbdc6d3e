use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use super::Sx1262;
use crate::{clock::Clock, commands::GetStatus, error::Error};

/// Pause before each status query. The chip needs about 4 ms before a mode change shows up
/// in its status byte.
const SETTLE_MS: u32 = 5;

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Polls GetStatus until the chip reports the last command as processed
    ///
    /// Returns `Ok(false)` once `timeout_ms` has elapsed without an idle status. Each
    /// iteration sleeps before querying, so a command that has not yet moved the chip out
    /// of its previous state is not mistaken for a finished one.
    pub fn wait_for_idle(&mut self, timeout_ms: u32) -> Result<bool, Error> {
        let start = self.clock.now_ms();

        loop {
            self.clock.delay_ms(SETTLE_MS);

            let status = self.device.execute_command(GetStatus)?;
            log::trace!(
                "status {:#04x}: mode {}, command status {}",
                status.0,
                status.chip_mode_bits(),
                status.command_status_bits()
            );
            if status.is_idle() {
                return Ok(true);
            }

            if self.clock.now_ms().saturating_sub(start) >= u64::from(timeout_ms) {
                return Ok(false);
            }
        }
    }

    /// [`wait_for_idle`](Self::wait_for_idle), with a timeout reported as an error
    pub(crate) fn await_idle(&mut self, opcode: u8, timeout_ms: u32) -> Result<(), Error> {
        if self.wait_for_idle(timeout_ms)? {
            Ok(())
        } else {
            log::warn!("command {:#04x} still busy after {} ms", opcode, timeout_ms);
            Err(Error::Timeout {
                opcode,
                waited_ms: timeout_ms,
            })
        }
    }
}
