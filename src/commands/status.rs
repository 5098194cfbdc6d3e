//! Status commands
//!
//! This module contains commands for monitoring device status:
//! - Device operating mode and command status
//! - Received packet signal quality
//! - Location and length of the last received payload
//!
//! The status byte is also what the driver polls to decide when a command has been
//! processed; see [`Status::is_idle`].

use core::convert::Infallible;

use regiface::FromByteArray;

use crate::{Command, NoParameters};

/// Error type for invalid operating mode values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOperatingMode(pub u8);

/// Error type for invalid command status values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCommandStatus(pub u8);

/// Operating mode of the device
///
/// Represents the current state of the radio's state machine.
/// Extracted from status byte bits 6:4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// STDBY_RC mode: RC oscillator running
    StandbyRc = 0x2,
    /// STDBY_XOSC mode: Crystal oscillator running
    StandbyXosc = 0x3,
    /// FS mode: Frequency synthesizer running
    FrequencySynthesizer = 0x4,
    /// RX mode: Receiving packets
    Receive = 0x5,
    /// TX mode: Transmitting packets
    Transmit = 0x6,
}

impl TryFrom<u8> for OperatingMode {
    type Error = InvalidOperatingMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x2 => Ok(Self::StandbyRc),
            0x3 => Ok(Self::StandbyXosc),
            0x4 => Ok(Self::FrequencySynthesizer),
            0x5 => Ok(Self::Receive),
            0x6 => Ok(Self::Transmit),
            invalid => Err(InvalidOperatingMode(invalid)),
        }
    }
}

/// Command processing status
///
/// Indicates the result of the last command execution.
/// Extracted from status byte bits 3:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Data is available to be read from the radio
    DataAvailable = 0x2,
    /// Command timed out during execution
    Timeout = 0x3,
    /// Error occurred during command processing
    ProcessingError = 0x4,
    /// Command execution failed
    ExecutionFailure = 0x5,
    /// TX operation completed successfully
    TxDone = 0x6,
}

impl TryFrom<u8> for CommandStatus {
    type Error = InvalidCommandStatus;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x2 => Ok(Self::DataAvailable),
            0x3 => Ok(Self::Timeout),
            0x4 => Ok(Self::ProcessingError),
            0x5 => Ok(Self::ExecutionFailure),
            0x6 => Ok(Self::TxDone),
            invalid => Err(InvalidCommandStatus(invalid)),
        }
    }
}

/// Device status byte
///
/// # Status Byte Format
/// - Bits 7: Reserved
/// - Bits 6:4: Operating mode
/// - Bits 3:1: Command status
/// - Bits 0: Reserved
///
/// Kept raw: right after reset and while a command is still executing the chip reports
/// codes that have no [`OperatingMode`] or [`CommandStatus`] meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Raw chip mode, bits 6:4
    pub fn chip_mode_bits(self) -> u8 {
        (self.0 >> 4) & 0x7
    }

    /// Raw command status, bits 3:1
    pub fn command_status_bits(self) -> u8 {
        (self.0 >> 1) & 0x7
    }

    pub fn mode(self) -> Result<OperatingMode, InvalidOperatingMode> {
        OperatingMode::try_from(self.chip_mode_bits())
    }

    pub fn command_status(self) -> Result<CommandStatus, InvalidCommandStatus> {
        CommandStatus::try_from(self.command_status_bits())
    }

    /// Whether the last command looks finished
    ///
    /// Command status codes 0-2 mean the chip may still be busy. A chip sitting in
    /// either standby mode is idle whatever its command status says.
    pub fn is_idle(self) -> bool {
        let still_busy = matches!(self.command_status_bits(), 0 | 1 | 2);
        let in_standby = matches!(
            self.mode(),
            Ok(OperatingMode::StandbyRc | OperatingMode::StandbyXosc)
        );
        !still_busy || in_standby
    }
}

impl FromByteArray for Status {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes[0]))
    }
}

/// GetStatus command (0xC0)
///
/// Returns the current device status including operating mode and command status.
#[derive(Debug, Clone)]
pub struct GetStatus;

impl Command for GetStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Status;

    fn id() -> Self::IdType {
        0xC0
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// GetRxBufferStatus response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxBufferStatus {
    /// Device status from the first response byte
    pub status: Status,
    /// Length of the last received payload
    pub payload_length: u8,
    /// Offset of the first payload byte in the data buffer
    pub buffer_pointer: u8,
}

impl FromByteArray for RxBufferStatus {
    type Error = Infallible;
    type Array = [u8; 3]; // 1 status byte + 2 buffer bytes

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: Status(bytes[0]),
            payload_length: bytes[1],
            buffer_pointer: bytes[2],
        })
    }
}

/// GetRxBufferStatus command (0x13)
///
/// Returns the length and start offset of the last received payload.
#[derive(Debug, Clone)]
pub struct GetRxBufferStatus;

impl Command for GetRxBufferStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = RxBufferStatus;

    fn id() -> Self::IdType {
        0x13
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// GetPacketStatus response for LoRa packets, as sent by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPacketStatusResponse {
    /// Device status from the first response byte
    pub status: Status,
    /// Average RSSI over the packet, power is -value/2 dBm
    pub rssi_pkt: u8,
    /// SNR estimate, signed, in quarter dB
    pub snr_pkt: i8,
    /// RSSI of the despread signal, power is -value/2 dBm
    pub signal_rssi_pkt: u8,
}

impl FromByteArray for GetPacketStatusResponse {
    type Error = Infallible;
    type Array = [u8; 4]; // 1 status byte + 3 packet status bytes

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            status: Status(bytes[0]),
            rssi_pkt: bytes[1],
            snr_pkt: bytes[2] as i8,
            signal_rssi_pkt: bytes[3],
        })
    }
}

/// GetPacketStatus command (0x14)
///
/// Returns signal quality of the last received packet.
#[derive(Debug, Clone)]
pub struct GetPacketStatus;

impl Command for GetPacketStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = GetPacketStatusResponse;

    fn id() -> Self::IdType {
        0x14
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

/// Signal quality of the last received packet
///
/// All-zero until the first packet has been received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketStatus {
    /// Average RSSI over the packet in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i16,
    /// RSSI of the despread LoRa signal in dBm
    pub signal_rssi: i16,
}

impl From<GetPacketStatusResponse> for PacketStatus {
    fn from(response: GetPacketStatusResponse) -> Self {
        // Integer division truncates toward zero, so -41/2 is -20
        Self {
            rssi: -i16::from(response.rssi_pkt) / 2,
            snr: i16::from(response.snr_pkt) / 4,
            signal_rssi: -i16::from(response.signal_rssi_pkt) / 2,
        }
    }
}
