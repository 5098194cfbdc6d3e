use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiBus,
};

use super::Sx1262;
use crate::{
    clock::Clock,
    commands::{ClearIrqStatus, GetPacketStatus, GetRxBufferStatus, IrqMask, PacketStatus},
    error::Error,
    Command,
};

/// Pause between ClearIrqStatus attempts while DIO1 stays high
const IRQ_CLEAR_RETRY_MS: u32 = 1;

/// Give up on DIO1 releasing after this long
const IRQ_CLEAR_DEADLINE_MS: u32 = 100;

/// DIO1 sampling interval in [`Sx1262::blocking_receive`]
const DIO1_POLL_US: u32 = 500;

impl<SPI, NSS, RESET, DIO1, CLK> Sx1262<SPI, NSS, RESET, DIO1, CLK>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
    RESET: OutputPin,
    DIO1: InputPin,
    CLK: Clock,
{
    /// Fetches a received packet if one is waiting
    ///
    /// Enters receive mode first if needed. Returns `Ok(None)` when DIO1 is not asserted,
    /// otherwise the number of payload bytes copied into `buf`. A packet longer than `buf`
    /// is cut to fit and the rest is dropped. `Some(0)` is an empty packet.
    ///
    /// [`packet_status`](Self::packet_status) is updated for every packet fetched.
    pub fn poll_receive(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Error> {
        self.ensure_ready()?;
        self.set_receive_mode()?;

        if !self.dio1_asserted()? {
            return Ok(None);
        }

        self.clear_irqs()?;

        let packet = self.device.execute_command(GetPacketStatus)?;
        self.packet_status = PacketStatus::from(packet);

        let rx_buffer = self.device.execute_command(GetRxBufferStatus)?;
        let len = usize::from(rx_buffer.payload_length).min(buf.len());
        if len > 0 {
            self.device
                .read_buffer(rx_buffer.buffer_pointer, &mut buf[..len])?;
        }

        log::debug!(
            "received {} of {} bytes, rssi {} dBm, snr {} dB",
            len,
            rx_buffer.payload_length,
            self.packet_status.rssi,
            self.packet_status.snr
        );

        Ok(Some(len))
    }

    /// Waits for a packet, then fetches it like [`poll_receive`](Self::poll_receive)
    ///
    /// Returns `Ok(None)` if nothing arrived within `timeout_ms`. A timeout of 0 waits
    /// forever.
    pub fn blocking_receive(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<Option<usize>, Error> {
        self.ensure_ready()?;
        self.set_receive_mode()?;

        let start = self.clock.now_ms();
        while !self.dio1_asserted()? {
            if timeout_ms != 0
                && self.clock.now_ms().saturating_sub(start) >= u64::from(timeout_ms)
            {
                return Ok(None);
            }
            self.clock.delay_us(DIO1_POLL_US);
        }

        self.poll_receive(buf)
    }

    fn dio1_asserted(&mut self) -> Result<bool, Error> {
        self.dio1.is_high().map_err(|_| Error::Pin)
    }

    /// Clears every IRQ until DIO1 drops
    fn clear_irqs(&mut self) -> Result<(), Error> {
        let start = self.clock.now_ms();

        loop {
            self.device
                .execute_command(ClearIrqStatus { mask: IrqMask::ALL })?;
            if !self.dio1_asserted()? {
                return Ok(());
            }

            if self.clock.now_ms().saturating_sub(start) >= u64::from(IRQ_CLEAR_DEADLINE_MS) {
                log::warn!("DIO1 still asserted after clearing IRQs");
                return Err(Error::Timeout {
                    opcode: ClearIrqStatus::id(),
                    waited_ms: IRQ_CLEAR_DEADLINE_MS,
                });
            }
            self.clock.delay_ms(IRQ_CLEAR_RETRY_MS);
        }
    }
}
