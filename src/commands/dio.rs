//! DIO and IRQ control commands
//!
//! This module contains commands for configuring and controlling:
//! - IRQ generation and routing to DIO1
//! - Clearing latched IRQ flags
//! - RF switch control via DIO2
//!
//! The SX126x has 3 configurable DIO pins and 10 possible interrupt sources.
//! Each interrupt can be mapped to any DIO pin, and multiple interrupts
//! can be mapped to the same pin (OR function).

use bitflags::bitflags;
use core::convert::Infallible;

use crate::{Command, NoParameters, ToByteArray};

bitflags! {
    /// IRQ sources, as laid out in the 16-bit IRQ register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqMask: u16 {
        /// Packet transmission completed
        const TX_DONE = 1 << 0;
        /// Packet received
        const RX_DONE = 1 << 1;
        /// Preamble detected
        const PREAMBLE_DETECTED = 1 << 2;
        /// Valid sync word detected (FSK)
        const SYNC_WORD_VALID = 1 << 3;
        /// Valid LoRa header received
        const HEADER_VALID = 1 << 4;
        /// LoRa header CRC error
        const HEADER_ERROR = 1 << 5;
        /// Payload CRC error
        const CRC_ERROR = 1 << 6;
        /// Channel activity detection finished
        const CAD_DONE = 1 << 7;
        /// Channel activity detected
        const CAD_DETECTED = 1 << 8;
        /// RX or TX timeout
        const TIMEOUT = 1 << 9;
        /// Every bit, including reserved ones; what ClearIrqStatus sends to clear all
        const ALL = 0xFFFF;
    }
}

impl ToByteArray for IrqMask {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok(self.bits().to_be_bytes())
    }
}

/// DIO and IRQ configuration parameters
///
/// An IRQ appears on a DIO pin only if it is set both in `irq_mask`
/// and in that pin's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DioIrqConfig {
    /// IRQ enable mask
    pub irq_mask: IrqMask,

    /// DIO1 interrupt mapping mask
    pub dio1_mask: IrqMask,

    /// DIO2 interrupt mapping mask
    /// Ignored if DIO2 configured for RF switch control
    pub dio2_mask: IrqMask,

    /// DIO3 interrupt mapping mask
    pub dio3_mask: IrqMask,
}

impl ToByteArray for DioIrqConfig {
    type Error = Infallible;
    type Array = [u8; 8];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 8];
        bytes[0..2].copy_from_slice(&self.irq_mask.bits().to_be_bytes());
        bytes[2..4].copy_from_slice(&self.dio1_mask.bits().to_be_bytes());
        bytes[4..6].copy_from_slice(&self.dio2_mask.bits().to_be_bytes());
        bytes[6..8].copy_from_slice(&self.dio3_mask.bits().to_be_bytes());
        Ok(bytes)
    }
}

/// SetDioIrqParams command (0x08)
///
/// Configures the mapping between interrupt sources and DIO pins.
///
/// # Important Notes
/// - IRQs must be enabled in irq_mask to be generated
/// - Multiple IRQs can be mapped to same DIO (OR function)
#[derive(Debug, Clone)]
pub struct SetDioIrqParams {
    /// DIO and IRQ configuration parameters
    pub config: DioIrqConfig,
}

impl Command for SetDioIrqParams {
    type IdType = u8;
    type CommandParameters = DioIrqConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x08
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

/// ClearIrqStatus command (0x02)
///
/// Clears specified interrupt flags.
///
/// # Important Notes
/// - Only clears flags with corresponding mask bits set
/// - Clearing a flag releases the DIO line it was driving
#[derive(Debug, Clone)]
pub struct ClearIrqStatus {
    /// Flags to clear
    pub mask: IrqMask,
}

impl Command for ClearIrqStatus {
    type IdType = u8;
    type CommandParameters = IrqMask;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x02
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.mask
    }
}

/// RF switch control configuration
#[derive(Debug, Clone, Copy)]
pub struct RfSwitchConfig {
    /// Enable RF switch control on DIO2
    /// - true = DIO2 controls RF switch
    /// - false = DIO2 available for IRQ mapping
    pub enable: bool,
}

impl ToByteArray for RfSwitchConfig {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.enable as u8])
    }
}

/// SetDio2AsRfSwitchCtrl command (0x9D)
///
/// Configures DIO2 to automatically control an RF switch.
///
/// # Important Notes
/// - When enabled, DIO2 = 1 in TX mode, 0 otherwise
/// - Overrides any IRQ mapping to DIO2
#[derive(Debug, Clone)]
pub struct SetDio2AsRfSwitchCtrl {
    /// RF switch configuration
    pub config: RfSwitchConfig,
}

impl Command for SetDio2AsRfSwitchCtrl {
    type IdType = u8;
    type CommandParameters = RfSwitchConfig;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        0x9D
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_done_on_dio1_layout() {
        let config = DioIrqConfig {
            irq_mask: IrqMask::RX_DONE,
            dio1_mask: IrqMask::ALL,
            dio2_mask: IrqMask::empty(),
            dio3_mask: IrqMask::empty(),
        };
        assert_eq!(
            config.to_bytes(),
            Ok([0x00, 0x02, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00])
        );
        assert_eq!(IrqMask::ALL.to_bytes(), Ok([0xFF, 0xFF]));
    }
}
