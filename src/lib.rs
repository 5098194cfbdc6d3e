#![cfg_attr(not(any(test, feature = "std")), no_std)]
//! SX1262 LoRa Radio Driver
//!
//! This crate drives a Semtech SX1262 sub-GHz transceiver in LoRa mode over its SPI
//! command protocol. The chip is configured, switched between standby and receive, and
//! sent and fetched packets entirely through opcode framed exchanges, with completion
//! observed by polling the status byte.
//!
//! # Features
//! - Frequency range: 150-960 MHz
//! - LoRa modulation: SF5-12, BW 7.8-500 kHz, CR 4/5-4/8
//! - +22 dBm output on the high power PA, DIO2 driving the antenna switch
//! - Variable length packets up to 255 bytes, RxDone signalled on DIO1
//! - Blocking operation with every wait bounded by an injectable [`Clock`]
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Bus level interface for hardware interaction
//!   - One chip-select bracketed exchange per command, register or buffer access
//!   - Owns the SPI bus and the NSS line
//!
//! - [`commands`]: Command interface for radio control
//!   - [`commands::rf`]: RF, modulation and packet configuration
//!   - [`commands::dio`]: DIO and interrupt control
//!   - [`commands::operational`]: TX/RX and PA control
//!   - [`commands::status`]: Status and packet metrics
//!
//! - [`registers`]: The register used to check the chip is wired up
//!
//! - [`config`]: Validated frequency and modulation settings
//!
//! - [`radio`]: The [`Sx1262`] driver: bring-up, configuration, receive mode, transmit
//!   and receive
//!
//! # Usage
//! The driver uses the `regiface` crate to describe commands and registers as types.
//! Most applications only need [`Sx1262`]:
//!
//! 1. Create an [`Sx1262`] from the SPI bus, the NSS, NRESET and DIO1 lines and a [`Clock`]
//! 2. Call [`Sx1262::init`] to reset and configure the chip
//! 3. Adjust frequency and modulation, or apply a [`Preset`]
//! 4. [`transmit`](Sx1262::transmit), or [`poll_receive`](Sx1262::poll_receive) /
//!    [`blocking_receive`](Sx1262::blocking_receive)
//!
//! Lower level access is available through [`Device`] for anything the driver does not
//! cover.
//!
//! # Important Notes
//! - Operations block; a transmit at SF12 can take minutes
//! - Received packets longer than the caller's buffer are truncated silently
//! - Transmit payloads longer than 255 bytes are truncated silently
//!
//! # Example
//! ```no_run
//! # fn demo<SPI, NSS, RESET, DIO1, CLK>(
//! #     spi: SPI, nss: NSS, reset: RESET, dio1: DIO1, clock: CLK,
//! # ) -> Result<(), sx1262_lora::Error>
//! # where
//! #     SPI: embedded_hal::spi::SpiBus<u8>,
//! #     NSS: embedded_hal::digital::OutputPin,
//! #     RESET: embedded_hal::digital::OutputPin,
//! #     DIO1: embedded_hal::digital::InputPin,
//! #     CLK: sx1262_lora::Clock,
//! # {
//! use sx1262_lora::Sx1262;
//!
//! let mut radio = Sx1262::new(spi, nss, reset, dio1, clock);
//! radio.init()?;
//! radio.set_frequency(868_000_000)?;
//! radio.transmit(b"hello")?;
//! # Ok(())
//! # }
//! ```

use regiface::*;

pub mod clock;
pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod radio;
pub mod registers;

pub use clock::Clock;
#[cfg(feature = "std")]
pub use clock::StdClock;
pub use commands::*;
pub use config::{Bandwidth, CodingRate, InvalidConfig, Preset, RadioConfig, SpreadingFactor};
pub use device::Device;
pub use error::{DeviceError, Error};
pub use radio::{RadioMode, Sx1262};
pub use registers::*;
