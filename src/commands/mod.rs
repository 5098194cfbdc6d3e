//! Radio command implementations
//!
//! This module contains the SX126x commands the driver issues, one type per opcode.
//! Commands are organized into functional categories:
//!
//! # Command Categories
//! - [`dio`]: DIO and IRQ control commands
//!   - Route RxDone to DIO1
//!   - Clear latched interrupts
//!   - Hand DIO2 to the RF switch
//!
//! - [`operational`]: Operating mode control commands
//!   - Enter TX and RX
//!   - Configure the RX timer and the PA
//!
//! - [`rf`]: RF and packet configuration commands
//!   - Set frequency, packet type and modulation
//!   - Configure packet formatting and TX power
//!
//! - [`status`]: Status and monitoring commands
//!   - Read device status
//!   - Read received packet metrics and buffer location
//!
//! # Command Execution
//! Every command is a single chip-select bracketed exchange: the opcode, the encoded
//! parameters, then one NOP byte per response byte. The chip does not acknowledge a
//! command inline. Completion is observed afterwards by polling [`GetStatus`] until
//! [`Status::is_idle`] holds.
//!
//! # Important Notes
//! - Packet type must be set before modulation and packet parameters
//! - SetPaConfig must precede SetTxParams
//! - Data buffer access (WriteBuffer/ReadBuffer) is done through
//!   [`Device`](crate::Device) directly, since its length is only known at runtime

pub mod dio;
pub mod operational;
pub mod rf;
pub mod status;

pub use dio::*;
pub use operational::*;
pub use rf::*;
pub use status::*;
