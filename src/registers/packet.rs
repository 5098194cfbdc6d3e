//! Packet handling related registers

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister};

/// Reset value of the LoRa sync word MSB
pub const LORA_SYNC_WORD_MSB_RESET: u8 = 0x14;

/// LoRa sync word register, most significant byte (address: 0x0740)
///
/// The full sync word spans 0x0740-0x0741 and resets to 0x1424 (private network).
/// The MSB reading back its reset value confirms the chip answers on the bus.
#[register(0x0740u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister)]
pub struct LoraSyncWordMsb {
    /// Sync word MSB
    /// Default: 0x14
    pub value: u8,
}

impl LoraSyncWordMsb {
    /// Whether the register still holds its reset value
    pub fn is_reset_value(&self) -> bool {
        self.value == LORA_SYNC_WORD_MSB_RESET
    }
}

impl Default for LoraSyncWordMsb {
    fn default() -> Self {
        Self {
            value: LORA_SYNC_WORD_MSB_RESET,
        }
    }
}

impl FromByteArray for LoraSyncWordMsb {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}
