//! SX126x Radio Device Interface
//!
//! This module provides the bus level interface to an SX126x radio: one opcode framed
//! exchange per chip-select assertion.
//!
//! The interface is built around the `Device<SPI, NSS>` struct which owns the SPI bus
//! and the chip-select line and provides methods for:
//! - Reading device registers
//! - Reading and writing the device's data buffer
//! - Executing radio commands
//!
//! Chip-select is held by a guard for the duration of one exchange and released on every
//! exit path, including SPI errors. Bytes are clocked through a fixed 32 byte window so
//! caller buffers are never handed to the bus for in-place transfers.
//!
//! # Example
//! ```no_run
//! # fn demo<SPI, NSS>(spi: SPI, nss: NSS) -> Result<(), regiface::errors::Error>
//! # where SPI: embedded_hal::spi::SpiBus<u8>, NSS: embedded_hal::digital::OutputPin {
//! use sx1262_lora::{Device, GetStatus, LoraSyncWordMsb};
//!
//! let mut device = Device::new(spi, nss);
//!
//! // Read a register
//! let sync_word: LoraSyncWordMsb = device.read_register()?;
//!
//! // Write to buffer
//! device.write_buffer(0, &[0x01, 0x02, 0x03])?;
//!
//! // Execute a command
//! let status = device.execute_command(GetStatus)?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use embedded_hal::{digital::OutputPin, spi::SpiBus};
use regiface::{
    errors::Error as RegifaceError, ByteArray, Command, FromByteArray, ReadableRegister,
    ToByteArray,
};

/// Bytes clocked per SPI transfer
const WINDOW_LEN: usize = 32;

/// Filler clocked out while the chip answers
const NOP: u8 = 0x00;

const OPCODE_READ_REGISTER: u8 = 0x1D;
const OPCODE_WRITE_BUFFER: u8 = 0x0E;
const OPCODE_READ_BUFFER: u8 = 0x1E;

/// Main device interface for the SX126x radio.
///
/// Owns the SPI bus and the NSS line, so only one exchange can be in flight.
pub struct Device<SPI, NSS> {
    spi: SPI,
    nss: NSS,
}

impl<SPI, NSS> Device<SPI, NSS> {
    /// Creates a new Device instance wrapping the provided SPI bus and chip-select pin.
    ///
    /// # Arguments
    /// * `spi` - An SPI bus implementing the embedded-hal `SpiBus` trait
    /// * `nss` - The chip-select line, active low
    pub fn new(spi: SPI, nss: NSS) -> Self {
        Self { spi, nss }
    }

    /// Releases the underlying SPI bus and chip-select pin.
    pub fn release(self) -> (SPI, NSS) {
        (self.spi, self.nss)
    }
}

/// Asserted chip-select, released on drop
struct ChipSelect<'a, NSS: OutputPin> {
    nss: &'a mut NSS,
}

impl<'a, NSS: OutputPin> ChipSelect<'a, NSS> {
    fn assert(nss: &'a mut NSS) -> Result<Self, RegifaceError> {
        nss.set_low().map_err(|_| RegifaceError::BusError)?;
        Ok(Self { nss })
    }
}

impl<NSS: OutputPin> Drop for ChipSelect<'_, NSS> {
    fn drop(&mut self) {
        if self.nss.set_high().is_err() {
            log::warn!("failed to release chip select");
        }
    }
}

impl<SPI, NSS> Device<SPI, NSS>
where
    SPI: SpiBus<u8>,
    NSS: OutputPin,
{
    /// Drives chip-select inactive.
    ///
    /// Used before the first exchange after power-up, when the line state is unknown.
    pub fn deselect(&mut self) -> Result<(), RegifaceError> {
        self.nss.set_high().map_err(|_| RegifaceError::BusError)
    }

    /// Reads a register value from the device.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u16 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse register value
    pub fn read_register<R>(&mut self) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u16>,
    {
        let [high, low] = R::id().to_be_bytes();
        let mut raw_value = R::Array::new();

        self.exchange(
            OPCODE_READ_REGISTER,
            &[high, low, NOP],
            &[],
            raw_value.as_mut(),
        )?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes bytes to the device's buffer at a specified offset.
    ///
    /// # Arguments
    /// * `offset` - Starting position in the buffer
    /// * `bytes` - Data to write, copied through the transfer window
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn write_buffer(&mut self, offset: u8, bytes: &[u8]) -> Result<(), RegifaceError> {
        self.exchange(OPCODE_WRITE_BUFFER, &[offset], bytes, &mut [])
    }

    /// Reads bytes from the device's buffer starting at a specified offset.
    ///
    /// # Arguments
    /// * `offset` - Starting position in the buffer to read from
    /// * `bytes` - Buffer to store read data
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    pub fn read_buffer(&mut self, offset: u8, bytes: &mut [u8]) -> Result<(), RegifaceError> {
        self.exchange(OPCODE_READ_BUFFER, &[offset, NOP], &[], bytes)
    }

    /// Executes a command on the device.
    ///
    /// # Type Parameters
    /// * `C` - Command type implementing the Command trait with u8 ID
    ///
    /// # Arguments
    /// * `command` - The command to execute
    ///
    /// # Returns
    /// Command response parameters on success
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - SPI communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse command response
    pub fn execute_command<C>(&mut self, command: C) -> Result<C::ResponseParameters, RegifaceError>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
    {
        let request = into_ok(command.invoking_parameters().to_bytes());
        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();

        self.exchange(C::id(), request.as_ref(), &[], raw_response.as_mut())?;

        C::ResponseParameters::from_bytes(raw_response)
            .map_err(|_| RegifaceError::DeserializationError)
    }

    /// One chip-select bracketed exchange
    ///
    /// Clocks out `opcode`, `params` and `payload`, then clocks NOPs while capturing
    /// `response.len()` bytes into `response`.
    fn exchange(
        &mut self,
        opcode: u8,
        params: &[u8],
        payload: &[u8],
        response: &mut [u8],
    ) -> Result<(), RegifaceError> {
        let Self { spi, nss } = self;
        let _cs = ChipSelect::assert(nss)?;

        log::trace!(
            "opcode {:#04x}: {} param, {} payload, {} response bytes",
            opcode,
            params.len(),
            payload.len(),
            response.len()
        );

        let mut window = [NOP; WINDOW_LEN];

        let head = params.len().min(WINDOW_LEN - 1);
        window[0] = opcode;
        window[1..=head].copy_from_slice(&params[..head]);
        spi.transfer_in_place(&mut window[..=head])
            .map_err(|_| RegifaceError::BusError)?;

        for chunk in params[head..]
            .chunks(WINDOW_LEN)
            .chain(payload.chunks(WINDOW_LEN))
        {
            let window = &mut window[..chunk.len()];
            window.copy_from_slice(chunk);
            spi.transfer_in_place(window)
                .map_err(|_| RegifaceError::BusError)?;
        }

        for chunk in response.chunks_mut(WINDOW_LEN) {
            chunk.fill(NOP);
            spi.transfer_in_place(chunk)
                .map_err(|_| RegifaceError::BusError)?;
        }

        spi.flush().map_err(|_| RegifaceError::BusError)
    }
}

fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{GetStatus, RfFrequency, SetRfFrequency, Status};
    use crate::registers::LoraSyncWordMsb;

    use embedded_hal_mock::eh1::digital::{
        Mock as DigitalMock, State, Transaction as GpioTransaction,
    };
    use embedded_hal_mock::eh1::spi::{Mock as SpiBusMock, Transaction as SpiTransaction};

    fn selected_once() -> [GpioTransaction; 2] {
        [
            GpioTransaction::set(State::Low),
            GpioTransaction::set(State::High),
        ]
    }

    fn check_expectations(device: Device<SpiBusMock<u8>, DigitalMock>) {
        let (mut spi, mut nss) = device.release();
        spi.done();
        nss.done();
    }

    #[test]
    fn test_command_framing() {
        let spi = SpiBusMock::new(&[
            SpiTransaction::transfer_in_place(
                vec![0x86, 0x39, 0x30, 0x00, 0x00],
                vec![0x00, 0x00, 0x00, 0x00, 0x00],
            ),
            SpiTransaction::flush(),
        ]);
        let nss = DigitalMock::new(&selected_once());
        let mut device = Device::new(spi, nss);

        device
            .execute_command(SetRfFrequency {
                frequency: RfFrequency::from_hz(915_000_000),
            })
            .unwrap();

        check_expectations(device);
    }

    #[test]
    fn test_status_response_follows_opcode() {
        let spi = SpiBusMock::new(&[
            SpiTransaction::transfer_in_place(vec![0xC0], vec![0xA2]),
            SpiTransaction::transfer_in_place(vec![0x00], vec![0x22]),
            SpiTransaction::flush(),
        ]);
        let nss = DigitalMock::new(&selected_once());
        let mut device = Device::new(spi, nss);

        let status = device.execute_command(GetStatus).unwrap();
        assert_eq!(status, Status(0x22));

        check_expectations(device);
    }

    #[test]
    fn test_read_register() {
        let spi = SpiBusMock::new(&[
            SpiTransaction::transfer_in_place(
                vec![0x1D, 0x07, 0x40, 0x00],
                vec![0xA2, 0xA2, 0xA2, 0xA2],
            ),
            SpiTransaction::transfer_in_place(vec![0x00], vec![0x14]),
            SpiTransaction::flush(),
        ]);
        let nss = DigitalMock::new(&selected_once());
        let mut device = Device::new(spi, nss);

        let register: LoraSyncWordMsb = device.read_register().unwrap();
        assert!(register.is_reset_value());

        check_expectations(device);
    }

    #[test]
    fn test_write_buffer_is_windowed() {
        let payload: Vec<u8> = (0..40).collect();
        let spi = SpiBusMock::new(&[
            SpiTransaction::transfer_in_place(vec![0x0E, 0x00], vec![0xA2, 0xA2]),
            SpiTransaction::transfer_in_place(payload[..32].to_vec(), vec![0xA2; 32]),
            SpiTransaction::transfer_in_place(payload[32..].to_vec(), vec![0xA2; 8]),
            SpiTransaction::flush(),
        ]);
        let nss = DigitalMock::new(&selected_once());
        let mut device = Device::new(spi, nss);

        device.write_buffer(0, &payload).unwrap();

        // Chip responses never land in the caller's buffer
        assert_eq!(payload, (0..40).collect::<Vec<u8>>());

        check_expectations(device);
    }

    #[test]
    fn test_read_buffer() {
        let spi = SpiBusMock::new(&[
            SpiTransaction::transfer_in_place(vec![0x1E, 0x80, 0x00], vec![0xA2, 0xA2, 0xA2]),
            SpiTransaction::transfer_in_place(vec![0x00; 3], vec![0x68, 0x69, 0x21]),
            SpiTransaction::flush(),
        ]);
        let nss = DigitalMock::new(&selected_once());
        let mut device = Device::new(spi, nss);

        let mut buf = [0xFF; 3];
        device.read_buffer(0x80, &mut buf).unwrap();
        assert_eq!(&buf, b"hi!");

        check_expectations(device);
    }
}
